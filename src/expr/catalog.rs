//! Informational function catalog for editors.
//!
//! Each entry carries a template that can be pasted into a binding as-is.
//! The catalog does not drive evaluation; [`Function`] does.

use serde::Serialize;

use super::functions::Function;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Text,
    Dates,
    Counters,
    Numbers,
    Conditionals,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Text,
        Category::Dates,
        Category::Counters,
        Category::Numbers,
        Category::Conditionals,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Text => "Texto",
            Category::Dates => "Fechas",
            Category::Counters => "Contadores",
            Category::Numbers => "Números",
            Category::Conditionals => "Condicionales",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionInfo {
    pub function: Function,
    pub category: Category,
    pub example: &'static str,
    pub description: &'static str,
}

impl FunctionInfo {
    pub fn name(&self) -> &'static str {
        self.function.name()
    }
}

pub static FUNCTION_CATALOG: &[FunctionInfo] = &[
    FunctionInfo {
        function: Function::Mayus,
        category: Category::Text,
        example: "{{MAYUS(nombre)}}",
        description: "Convierte el texto a mayúsculas",
    },
    FunctionInfo {
        function: Function::Minus,
        category: Category::Text,
        example: "{{MINUS(nombre)}}",
        description: "Convierte el texto a minúsculas",
    },
    FunctionInfo {
        function: Function::Recortar,
        category: Category::Text,
        example: "{{RECORTAR(descripcion, 20)}}",
        description: "Primeros N caracteres del texto",
    },
    FunctionInfo {
        function: Function::Concat,
        category: Category::Text,
        example: "{{CONCAT(nombre, \" - \", codigo)}}",
        description: "Une varios textos",
    },
    FunctionInfo {
        function: Function::Reemplazar,
        category: Category::Text,
        example: "{{REEMPLAZAR(codigo, \"-\", \"\")}}",
        description: "Reemplaza todas las apariciones de un texto",
    },
    FunctionInfo {
        function: Function::Largo,
        category: Category::Text,
        example: "{{LARGO(nombre)}}",
        description: "Cantidad de caracteres",
    },
    FunctionInfo {
        function: Function::Hoy,
        category: Category::Dates,
        example: "{{HOY()}}",
        description: "Fecha actual (DD/MM/AAAA por defecto)",
    },
    FunctionInfo {
        function: Function::Ahora,
        category: Category::Dates,
        example: "{{AHORA(hh:mm)}}",
        description: "Fecha y hora actual",
    },
    FunctionInfo {
        function: Function::SumarDias,
        category: Category::Dates,
        example: "{{SUMAR_DIAS(30)}}",
        description: "Fecha actual más N días",
    },
    FunctionInfo {
        function: Function::SumarMeses,
        category: Category::Dates,
        example: "{{SUMAR_MESES(6, MM/AAAA)}}",
        description: "Fecha actual más N meses",
    },
    FunctionInfo {
        function: Function::FormatoFecha,
        category: Category::Dates,
        example: "{{FORMATO_FECHA(AAAA-MM-DD)}}",
        description: "Formatea la fecha actual o una fecha dada",
    },
    FunctionInfo {
        function: Function::Contador,
        category: Category::Counters,
        example: "{{CONTADOR(1, 1, 4)}}",
        description: "Número correlativo: inicio, paso y relleno con ceros",
    },
    FunctionInfo {
        function: Function::Lote,
        category: Category::Counters,
        example: "{{LOTE(AAMMDD-####)}}",
        description: "Código de lote con fecha y secuencia",
    },
    FunctionInfo {
        function: Function::Redondear,
        category: Category::Numbers,
        example: "{{REDONDEAR(12.345, 2)}}",
        description: "Redondea a N decimales",
    },
    FunctionInfo {
        function: Function::FormatoNum,
        category: Category::Numbers,
        example: "{{FORMATO_NUM(1234.5, 2)}}",
        description: "Número con separador decimal del idioma",
    },
    FunctionInfo {
        function: Function::Si,
        category: Category::Conditionals,
        example: "{{SI(stock > 0, \"Disponible\", \"Agotado\")}}",
        description: "Elige un valor según una condición",
    },
    FunctionInfo {
        function: Function::Vacio,
        category: Category::Conditionals,
        example: "{{VACIO(lote)}}",
        description: "\"true\" si el texto está vacío",
    },
    FunctionInfo {
        function: Function::PorDefecto,
        category: Category::Conditionals,
        example: "{{POR_DEFECTO(marca, \"Genérico\")}}",
        description: "Valor alternativo cuando el campo está vacío",
    },
];

/// Catalog entries grouped by category, in display order.
pub fn by_category() -> Vec<(Category, Vec<&'static FunctionInfo>)> {
    Category::ALL
        .iter()
        .map(|&cat| {
            (
                cat,
                FUNCTION_CATALOG
                    .iter()
                    .filter(|info| info.category == cat)
                    .collect(),
            )
        })
        .collect()
}

pub fn lookup(function: Function) -> Option<&'static FunctionInfo> {
    FUNCTION_CATALOG.iter().find(|info| info.function == function)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{ERROR_MARKER, GenerationContext, evaluate};
    use crate::design::Row;
    use chrono::NaiveDate;

    #[test]
    fn test_every_function_is_listed_once() {
        for f in Function::ALL {
            let count = FUNCTION_CATALOG.iter().filter(|i| i.function == f).count();
            assert_eq!(count, 1, "{} listed {} times", f.name(), count);
        }
    }

    #[test]
    fn test_examples_evaluate() {
        let now = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let ctx = GenerationContext::new(now);
        let row: Row = [
            ("nombre", "Ana"),
            ("descripcion", "Harina 000 x 1kg"),
            ("codigo", "A-1"),
            ("stock", "3"),
            ("lote", ""),
            ("marca", ""),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        for info in FUNCTION_CATALOG {
            let out = evaluate(info.example, &row, &ctx);
            assert!(
                !out.contains(ERROR_MARKER),
                "{} example {:?} gave {:?}",
                info.name(),
                info.example,
                out
            );
        }
    }

    #[test]
    fn test_grouping_covers_catalog() {
        let total: usize = by_category().iter().map(|(_, v)| v.len()).sum();
        assert_eq!(total, FUNCTION_CATALOG.len());
        assert_eq!(lookup(Function::Lote).map(|i| i.category), Some(Category::Counters));
    }
}
