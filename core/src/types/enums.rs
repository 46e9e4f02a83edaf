//! SAT catalogs and other fixed code lists.

use crate::sanitize::catalog;

catalog! {
    /// File formats an invoice can be downloaded as.
    pub enum FileType {
        Pdf => "pdf",
        Xml => "xml",
        Zip => "zip",
    }
}

catalog! {
    /// Relation key between an invoice and previously issued ones.
    pub enum InvoiceRelation {
        NotaDeCredito => "01",
        NotaDeDebito => "02",
        DevolucionDeMercancia => "03",
        SustitucionDeCfdiPrevios => "04",
        TrasladosDeMercanciaFacturadosPreviamente => "05",
        FacturaPorTrasladosPrevios => "06",
        AplicacionDeAnticipo => "07",
        PagosEnParcialidades => "08",
        PagosDiferidos => "09",
    }
}

catalog! {
    /// Kind of CFDI.
    pub enum InvoiceType {
        Ingreso => "I",
        Egreso => "E",
        Traslado => "T",
        Nomina => "N",
        Pago => "P",
    }
}

catalog! {
    /// CFDI use code (`c_UsoCFDI`).
    pub enum InvoiceUse {
        AdquisicionMercancias => "G01",
        DevolucionesDescuentosBonificaciones => "G02",
        GastosEnGeneral => "G03",
        Construcciones => "I01",
        MobiliarioYEquipoDeOficina => "I02",
        EquipoDeTransporte => "I03",
        EquipoDeComputo => "I04",
        DadosTroquelesHerramental => "I05",
        ComunicacionesTelefonicas => "I06",
        ComunicacionesSatelitales => "I07",
        OtraMaquinaria => "I08",
        HonorariosMedicos => "D01",
        GastosMedicosPorIncapacidad => "D02",
        GastosFunerales => "D03",
        Donativos => "D04",
        InteresesPorCreditosHipotecarios => "D05",
        AportacionesVoluntariasSar => "D06",
        PrimaSegurosGastosMedicos => "D07",
        GastosTransportacionEscolar => "D08",
        CuentasAhorroPensiones => "D09",
        ServiciosEducativos => "D10",
        SinEfectosFiscales => "S01",
        Pagos => "CP01",
        Nomina => "CN01",
        PorDefinir => "P01",
    }
}

catalog! {
    /// Payment form code (`c_FormaPago`).
    pub enum PaymentForm {
        Efectivo => "01",
        ChequeNominativo => "02",
        TransferenciaElectronicaDeFondos => "03",
        TarjetaDeCredito => "04",
        MonederoElectronico => "05",
        DineroElectronico => "06",
        ValesDeDespensa => "08",
        DacionEnPago => "12",
        PagoPorSubrogacion => "13",
        PagoPorConsignacion => "14",
        Condonacion => "15",
        Compensacion => "17",
        Novacion => "23",
        Confusion => "24",
        RemisionDeDeuda => "25",
        PrescripcionOCaducidad => "26",
        ASatisfaccionDelAcreedor => "27",
        TarjetaDeDebito => "28",
        TarjetaDeServicios => "29",
        AplicacionDeAnticipos => "30",
        IntermediarioPagos => "31",
        PorDefinir => "99",
    }
}

catalog! {
    /// Payment method code (`c_MetodoPago`).
    pub enum PaymentMethod {
        /// Single payment (PUE).
        Contado => "PUE",
        /// Installments or deferred payment (PPD).
        Parcialidades => "PPD",
    }
}

catalog! {
    /// Tax regime of a customer (`c_RegimenFiscal`).
    pub enum TaxSystem {
        GeneralDeLeyPersonasMorales => "601",
        PersonasMoralesConFinesNoLucrativos => "603",
        SueldosYSalarios => "605",
        Arrendamiento => "606",
        EnajenacionOAdquisicionDeBienes => "607",
        DemasIngresos => "608",
        ResidentesEnElExtranjero => "610",
        IngresosPorDividendos => "611",
        ActividadesEmpresarialesYProfesionales => "612",
        IngresosPorIntereses => "614",
        IngresosPorObtencionDePremios => "615",
        SinObligacionesFiscales => "616",
        SociedadesCooperativasDeProduccion => "620",
        IncorporacionFiscal => "621",
        ActividadesAgricolasGanaderasSilvicolasYPesqueras => "622",
        OpcionalParaGruposDeSociedades => "623",
        Coordinados => "624",
        PlataformasTecnologicas => "625",
        RegimenSimplificadoDeConfianza => "626",
        Hidrocarburos => "628",
        RegimenesFiscalesPreferentesYEmpresasMultinacionales => "629",
        EnajenacionDeAccionesEnBolsaDeValores => "630",
    }
}

catalog! {
    /// Reason given when cancelling an invoice.
    pub enum CancellationMotive {
        ErroresConRelacion => "01",
        ErroresSinRelacion => "02",
        OperacionNoRealizada => "03",
        OperacionNominativaEnFacturaGlobal => "04",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::{CatalogCode, Sanitize};
    use serde_json::json;

    #[test]
    fn codes_are_unique_per_catalog() {
        fn assert_unique<T: CatalogCode>(all: &[T]) {
            let mut codes: Vec<&str> = all.iter().map(CatalogCode::code).collect();
            let before = codes.len();
            codes.sort_unstable();
            codes.dedup();
            assert_eq!(before, codes.len());
        }
        assert_unique(PaymentForm::ALL);
        assert_unique(InvoiceUse::ALL);
        assert_unique(TaxSystem::ALL);
        assert_unique(InvoiceRelation::ALL);
    }

    #[test]
    fn catalog_values_sanitize_to_codes() {
        assert_eq!(PaymentForm::TarjetaDeCredito.sanitize(), json!("04"));
        assert_eq!(PaymentMethod::Contado.sanitize(), json!("PUE"));
        assert_eq!(FileType::Zip.to_string(), "zip");
        assert_eq!(InvoiceUse::from_code("G03"), Some(InvoiceUse::GastosEnGeneral));
    }
}
