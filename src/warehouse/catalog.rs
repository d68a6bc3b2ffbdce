//! Dimension and fact definitions of the SECOP star schema

use crate::schema::{ColumnDef, ColumnType, TableSchema};

/// How a dimension's rows are obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionKind {
    /// Projected from its own extraction
    Extracted,
    /// Extracted signing dates expanded into calendar attributes
    Time,
    /// Distinct (departamento, ciudad) pairs of the entity dimension
    Geography,
}

/// Static definition of one dimension table
#[derive(Debug, Clone, Copy)]
pub struct DimensionSpec {
    /// Short name
    pub name: &'static str,
    /// Logical path in the table store
    pub path: &'static str,
    /// Surrogate key column
    pub key_column: &'static str,
    /// Source columns requested from the API (`$select`)
    pub select: &'static [&'static str],
    /// Grouping column (`$group`)
    pub group_by: Option<&'static str>,
    /// Output attribute columns, after the surrogate key
    pub columns: &'static [(&'static str, ColumnType)],
    /// Columns identifying a row; deduplication keeps the first occurrence
    pub natural_key: &'static [&'static str],
    /// Row origin
    pub kind: DimensionKind,
}

impl DimensionSpec {
    /// Output schema: surrogate key followed by the attribute columns
    pub fn schema(&self) -> TableSchema {
        let mut columns = vec![ColumnDef::required(self.key_column, ColumnType::Int64)];
        columns.extend(
            self.columns
                .iter()
                .map(|(name, column_type)| ColumnDef::new(*name, *column_type)),
        );
        TableSchema::new(columns)
    }

    /// Attribute column names
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|(name, _)| *name).collect()
    }
}

const U: ColumnType = ColumnType::Utf8;

/// Dimension definitions, in build order
///
/// `geografia` depends on `entidades` and must come after it.
pub const DIMENSIONS: [DimensionSpec; 13] = [
    DimensionSpec {
        name: "entidades",
        path: "gold/dim/entidades",
        key_column: "id_entidad",
        select: &["nit_entidad", "nombre_entidad", "departamento", "ciudad", "orden"],
        group_by: None,
        columns: &[
            ("nit_entidad", U),
            ("nombre_entidad", U),
            ("departamento", U),
            ("ciudad", U),
            ("orden", U),
        ],
        natural_key: &["nit_entidad"],
        kind: DimensionKind::Extracted,
    },
    DimensionSpec {
        name: "proveedores",
        path: "gold/dim/proveedores",
        key_column: "id_proveedor",
        select: &["documento_proveedor", "proveedor_adjudicado", "es_pyme"],
        group_by: None,
        columns: &[
            ("documento_proveedor", U),
            ("proveedor_adjudicado", U),
            ("es_pyme", U),
        ],
        natural_key: &["documento_proveedor"],
        kind: DimensionKind::Extracted,
    },
    DimensionSpec {
        name: "geografia",
        path: "gold/dim/geografia",
        key_column: "id_geografia",
        select: &[],
        group_by: None,
        columns: &[("departamento", U), ("ciudad", U)],
        natural_key: &["departamento", "ciudad"],
        kind: DimensionKind::Geography,
    },
    DimensionSpec {
        name: "tipo_contrato",
        path: "gold/dim/tipo_contrato",
        key_column: "id_tipo_contrato",
        select: &["tipo_modalidad_contrato"],
        group_by: Some("tipo_modalidad_contrato"),
        columns: &[("tipo_modalidad_contrato", U)],
        natural_key: &["tipo_modalidad_contrato"],
        kind: DimensionKind::Extracted,
    },
    DimensionSpec {
        name: "tiempo",
        path: "gold/dim/tiempo",
        key_column: "id_tiempo",
        select: &["fecha_de_firma"],
        group_by: Some("fecha_de_firma"),
        columns: &[
            ("fecha_completa", ColumnType::Timestamp),
            ("anio", ColumnType::Int64),
            ("mes", ColumnType::Int64),
            ("trimestre", ColumnType::Int64),
            ("dia_semana", U),
        ],
        natural_key: &["fecha_completa"],
        kind: DimensionKind::Time,
    },
    DimensionSpec {
        name: "estado_contrato",
        path: "gold/dim/estado_contrato",
        key_column: "id_estado_contrato",
        select: &[
            "estado_contrato",
            "es_liquidado",
            "habilita_pago_adelantado",
            "puede_ser_prorrogado",
        ],
        group_by: Some("estado_contrato"),
        columns: &[
            ("estado_contrato", U),
            ("es_liquidado", U),
            ("habilita_pago_adelantado", U),
            ("puede_ser_prorrogado", U),
        ],
        natural_key: &["estado_contrato"],
        kind: DimensionKind::Extracted,
    },
    DimensionSpec {
        name: "recursos_financieros",
        path: "gold/dim/recursos_financieros",
        key_column: "id_recurso",
        select: &[
            "origen_principal",
            "destino_gasto",
            "flag_pgn",
            "flag_regalias",
            "flag_sgp",
            "flag_otros",
        ],
        group_by: None,
        columns: &[
            ("origen_principal", U),
            ("destino_gasto", U),
            ("flag_pgn", U),
            ("flag_regalias", U),
            ("flag_sgp", U),
            ("flag_otros", U),
        ],
        natural_key: &[
            "origen_principal",
            "destino_gasto",
            "flag_pgn",
            "flag_regalias",
            "flag_sgp",
            "flag_otros",
        ],
        kind: DimensionKind::Extracted,
    },
    DimensionSpec {
        name: "marcadores_especiales",
        path: "gold/dim/marcadores_especiales",
        key_column: "id_marcador",
        select: &[
            "es_postconflicto",
            "obligacion_ambiental",
            "obligacion_postconsumo",
        ],
        group_by: None,
        columns: &[
            ("es_postconflicto", U),
            ("obligacion_ambiental", U),
            ("obligacion_postconsumo", U),
        ],
        natural_key: &[
            "es_postconflicto",
            "obligacion_ambiental",
            "obligacion_postconsumo",
        ],
        kind: DimensionKind::Extracted,
    },
    DimensionSpec {
        name: "responsables",
        path: "gold/dim/responsables",
        key_column: "id_responsable",
        select: &["nombre_responsable", "tipo_documento", "rol_responsable"],
        group_by: None,
        columns: &[
            ("nombre_responsable", U),
            ("tipo_documento", U),
            ("rol_responsable", U),
        ],
        natural_key: &["nombre_responsable", "tipo_documento", "rol_responsable"],
        kind: DimensionKind::Extracted,
    },
    DimensionSpec {
        name: "modalidad_adicional",
        path: "gold/dim/modalidad_adicional",
        key_column: "id_modalidad",
        select: &["modalidad_contrato", "es_tecnologia", "es_servicios", "es_obra"],
        group_by: Some("modalidad_contrato"),
        columns: &[
            ("modalidad_contrato", U),
            ("es_tecnologia", U),
            ("es_servicios", U),
            ("es_obra", U),
        ],
        natural_key: &["modalidad_contrato"],
        kind: DimensionKind::Extracted,
    },
    DimensionSpec {
        name: "tipo_pago",
        path: "gold/dim/tipo_pago",
        key_column: "id_tipo_pago",
        select: &["tipo_pago", "permite_anticipos", "plazo_maximo_pago"],
        group_by: Some("tipo_pago"),
        columns: &[
            ("tipo_pago", U),
            ("permite_anticipos", U),
            ("plazo_maximo_pago", U),
        ],
        natural_key: &["tipo_pago"],
        kind: DimensionKind::Extracted,
    },
    DimensionSpec {
        name: "entidad_supervision",
        path: "gold/dim/entidad_supervision",
        key_column: "id_entidad_supervision",
        select: &[
            "nombre_entidad_supervision",
            "tipo_entidad_supervision",
            "departamento",
            "ciudad",
        ],
        group_by: Some("nombre_entidad_supervision"),
        columns: &[
            ("nombre_entidad_supervision", U),
            ("tipo_entidad_supervision", U),
            ("departamento", U),
            ("ciudad", U),
        ],
        natural_key: &["nombre_entidad_supervision"],
        kind: DimensionKind::Extracted,
    },
    DimensionSpec {
        name: "categoria_contrato",
        path: "gold/dim/categoria_contrato",
        key_column: "id_categoria_contrato",
        select: &["categoria", "subcategoria", "es_prioritario"],
        group_by: Some("categoria"),
        columns: &[
            ("categoria", U),
            ("subcategoria", U),
            ("es_prioritario", U),
        ],
        natural_key: &["categoria"],
        kind: DimensionKind::Extracted,
    },
];

/// Look up a dimension definition by name
pub fn dimension_spec(name: &str) -> Option<&'static DimensionSpec> {
    DIMENSIONS.iter().find(|d| d.name == name)
}

/// How a join key is compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyNormalization {
    /// Compare text as-is
    Text,
    /// Parse as a timestamp and compare canonical text
    Timestamp,
}

/// One fact-to-dimension left join
#[derive(Debug, Clone, Copy)]
pub struct ForeignKeyJoin {
    /// Dimension name
    pub dimension: &'static str,
    /// Fact-side columns
    pub fact_columns: &'static [&'static str],
    /// Matching dimension columns
    pub dimension_columns: &'static [&'static str],
    /// Dimension surrogate key copied onto the fact row
    pub key_column: &'static str,
    /// Fact-side key normalization
    pub normalization: KeyNormalization,
}

/// Static definition of the fact table
#[derive(Debug, Clone, Copy)]
pub struct FactSpec {
    /// Short name
    pub name: &'static str,
    /// Logical path in the table store
    pub path: &'static str,
    /// Source columns requested from the API
    pub select: &'static [&'static str],
    /// Joins, applied in order
    pub joins: &'static [ForeignKeyJoin],
    /// Output columns
    pub columns: &'static [(&'static str, ColumnType)],
}

impl FactSpec {
    /// Output schema
    pub fn schema(&self) -> TableSchema {
        TableSchema::new(
            self.columns
                .iter()
                .map(|(name, column_type)| ColumnDef::new(*name, *column_type))
                .collect(),
        )
    }
}

const I: ColumnType = ColumnType::Int64;

/// The contracts fact table
pub const FACT: FactSpec = FactSpec {
    name: "contratos",
    path: "gold/facts/contratos",
    select: &[
        "id_contrato",
        "nit_entidad",
        "documento_proveedor",
        "departamento",
        "ciudad",
        "tipo_modalidad_contrato",
        "fecha_de_firma",
        "valor_contrato",
        "valor_pagado",
        "dias_adicionados",
    ],
    joins: &[
        ForeignKeyJoin {
            dimension: "entidades",
            fact_columns: &["nit_entidad"],
            dimension_columns: &["nit_entidad"],
            key_column: "id_entidad",
            normalization: KeyNormalization::Text,
        },
        ForeignKeyJoin {
            dimension: "proveedores",
            fact_columns: &["documento_proveedor"],
            dimension_columns: &["documento_proveedor"],
            key_column: "id_proveedor",
            normalization: KeyNormalization::Text,
        },
        ForeignKeyJoin {
            dimension: "geografia",
            fact_columns: &["departamento", "ciudad"],
            dimension_columns: &["departamento", "ciudad"],
            key_column: "id_geografia",
            normalization: KeyNormalization::Text,
        },
        ForeignKeyJoin {
            dimension: "tipo_contrato",
            fact_columns: &["tipo_modalidad_contrato"],
            dimension_columns: &["tipo_modalidad_contrato"],
            key_column: "id_tipo_contrato",
            normalization: KeyNormalization::Text,
        },
        ForeignKeyJoin {
            dimension: "tiempo",
            fact_columns: &["fecha_de_firma"],
            dimension_columns: &["fecha_completa"],
            key_column: "id_tiempo",
            normalization: KeyNormalization::Timestamp,
        },
    ],
    columns: &[
        ("id_contrato", U),
        ("id_entidad", I),
        ("id_proveedor", I),
        ("id_geografia", I),
        ("id_tipo_contrato", I),
        ("id_tiempo", I),
        ("valor_contrato", ColumnType::Float64),
        ("valor_pagado", ColumnType::Float64),
        ("dias_adicionados", I),
    ],
};
