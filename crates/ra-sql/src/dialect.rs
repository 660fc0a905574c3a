//! SQL dialect abstraction
//!
//! A dialect decides how identifiers, strings, literals and operators are
//! written. Built-in dialects share their behavior through [`DialectSettings`]
//! (quoting and operator renames) and a [`FormatterRegistry`] (full custom
//! renderers per operator name); the trait's default methods do the rest.

use ra_core::{TableDescription, Value};
use sqlparser::ast::Statement;
use sqlparser::dialect::{
    Dialect, DuckDbDialect as SqlParserDuckDb, GenericDialect as SqlParserGeneric,
    PostgreSqlDialect as SqlParserPostgres, SQLiteDialect as SqlParserSqlite,
};
use sqlparser::parser::Parser;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::error::{SqlError, SqlResult};
use crate::expr::{format_if_else, format_is_null};
use ra_core::Expression;

/// Custom renderer for one operator name
pub type Formatter =
    Arc<dyn Fn(&dyn SqlDialect, &Expression) -> SqlResult<String> + Send + Sync>;

/// Per-operator renderers, looked up after operator renames are applied
#[derive(Clone, Default)]
pub struct FormatterRegistry {
    formatters: HashMap<String, Formatter>,
}

impl FormatterRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the `is_null` and `if_else` renderers
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("is_null", format_is_null);
        registry.register("if_else", format_if_else);
        registry
    }

    /// Register (or replace) the renderer for `op`
    pub fn register<F>(&mut self, op: impl Into<String>, formatter: F)
    where
        F: Fn(&dyn SqlDialect, &Expression) -> SqlResult<String> + Send + Sync + 'static,
    {
        self.formatters.insert(op.into(), Arc::new(formatter));
    }

    pub fn get(&self, op: &str) -> Option<&Formatter> {
        self.formatters.get(op)
    }

    pub fn contains(&self, op: &str) -> bool {
        self.formatters.contains_key(op)
    }
}

impl fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.formatters.keys().collect();
        names.sort();
        f.debug_struct("FormatterRegistry")
            .field("formatters", &names)
            .finish()
    }
}

/// Quoting and operator-rename settings shared by the built-in dialects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialectSettings {
    pub identifier_quote: char,
    pub string_quote: char,
    /// Operator name rewrites, e.g. `==` to `=`
    pub op_replacements: BTreeMap<String, String>,
    /// Table qualifier keys the dialect can render, outermost first
    pub supported_qualifiers: Vec<String>,
    /// Append `NULLS LAST` to every ORDER BY term
    pub nulls_last: bool,
}

impl Default for DialectSettings {
    fn default() -> Self {
        let op_replacements = [("==", "="), ("!=", "<>"), ("mean", "avg"), ("log", "ln")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            identifier_quote: '"',
            string_quote: '\'',
            op_replacements,
            supported_qualifiers: Vec::new(),
            nulls_last: true,
        }
    }
}

/// Trait for SQL dialect implementations
pub trait SqlDialect: Send + Sync {
    /// Get the underlying sqlparser dialect
    fn parser_dialect(&self) -> &dyn Dialect;

    /// Get the dialect name
    fn name(&self) -> &'static str;

    fn settings(&self) -> &DialectSettings;

    fn formatters(&self) -> &FormatterRegistry;

    /// Parse SQL into AST statements
    fn parse(&self, sql: &str) -> SqlResult<Vec<Statement>> {
        Parser::parse_sql(self.parser_dialect(), sql).map_err(|e| {
            let msg = e.to_string();
            // Extract line/column from error message (format: "... at Line: X, Column: Y")
            let (line, column) = parse_location_from_error(&msg);
            SqlError::ParseError {
                message: msg,
                line,
                column,
            }
        })
    }

    /// Quote an identifier; names containing the quote character are rejected
    fn quote_identifier(&self, ident: &str) -> SqlResult<String> {
        let quote = self.settings().identifier_quote;
        if ident.contains(quote) {
            return Err(SqlError::QuoteInIdentifier {
                ident: ident.to_string(),
                quote,
            });
        }
        Ok(format!("{quote}{ident}{quote}"))
    }

    /// Quote a string literal, doubling embedded quotes
    fn quote_string(&self, s: &str) -> String {
        let quote = self.settings().string_quote;
        let doubled: String = [quote, quote].iter().collect();
        format!("{quote}{}{quote}", s.replace(quote, &doubled))
    }

    /// Render a literal value
    fn render_literal(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(true) => "TRUE".to_string(),
            Value::Bool(false) => "FALSE".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) if f.is_nan() => "NULL".to_string(),
            Value::Float(f) if f.is_infinite() => {
                let text = if *f > 0.0 { "Infinity" } else { "-Infinity" };
                format!("CAST({} AS DOUBLE PRECISION)", self.quote_string(text))
            }
            // Debug keeps the decimal point: 1.0, 0.25, 1e20
            Value::Float(f) => format!("{f:?}"),
            Value::Str(s) => self.quote_string(s),
        }
    }

    /// Operator name after configured renames
    fn render_operator<'a>(&'a self, op: &'a str) -> &'a str {
        self.settings()
            .op_replacements
            .get(op)
            .map_or(op, String::as_str)
    }

    /// Render a table reference, including supported qualifiers
    fn quote_table_name(&self, table: &TableDescription) -> SqlResult<String> {
        let supported = &self.settings().supported_qualifiers;
        let unsupported: Vec<&String> = table
            .qualifiers()
            .keys()
            .filter(|k| !supported.contains(k))
            .collect();
        if !unsupported.is_empty() {
            let names: Vec<&str> = unsupported.iter().map(|k| k.as_str()).collect();
            return Err(SqlError::QualifiersNotSupported {
                dialect: self.name().to_string(),
                qualifiers: names.join(", "),
            });
        }
        let mut parts = Vec::new();
        for key in supported {
            if let Some(value) = table.qualifiers().get(key) {
                parts.push(self.quote_identifier(value)?);
            }
        }
        parts.push(self.quote_identifier(table.table_name())?);
        Ok(parts.join("."))
    }
}

/// Parse line and column from sqlparser error message.
///
/// sqlparser's `ParserError` is a simple string wrapper with no structured
/// location data, so we extract "Line: N, Column: M" from the error message text.
fn parse_location_from_error(msg: &str) -> (usize, usize) {
    let Some(line_idx) = msg.find("Line: ") else {
        return (0, 0);
    };
    let line_start = line_idx + 6;
    let Some(comma_idx) = msg[line_start..].find(',') else {
        return (0, 0);
    };
    let Ok(line) = msg[line_start..line_start + comma_idx]
        .trim()
        .parse::<usize>()
    else {
        return (0, 0);
    };
    let Some(col_idx) = msg.find("Column: ") else {
        return (0, 0);
    };
    let col_start = col_idx + 8;
    let col_end = msg[col_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map(|i| col_start + i)
        .unwrap_or(msg.len());
    let Ok(column) = msg[col_start..col_end].trim().parse::<usize>() else {
        return (0, 0);
    };
    (line, column)
}

macro_rules! builtin_dialect {
    ($(#[$doc:meta])* $name:ident, $parser:ident, $label:literal, [$($qualifier:literal),*]) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $name {
            dialect: $parser,
            settings: DialectSettings,
            formatters: FormatterRegistry,
        }

        impl $name {
            /// Create the dialect with its default settings and built-in formatters
            pub fn new() -> Self {
                let settings = DialectSettings {
                    supported_qualifiers: vec![$($qualifier.to_string()),*],
                    ..DialectSettings::default()
                };
                Self::with_settings(settings)
            }

            /// Create the dialect with explicit settings
            pub fn with_settings(settings: DialectSettings) -> Self {
                Self {
                    dialect: $parser {},
                    settings,
                    formatters: FormatterRegistry::with_builtins(),
                }
            }

            /// Register a custom renderer for `op`
            pub fn register_formatter<F>(&mut self, op: impl Into<String>, formatter: F)
            where
                F: Fn(&dyn SqlDialect, &Expression) -> SqlResult<String> + Send + Sync + 'static,
            {
                self.formatters.register(op, formatter);
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl SqlDialect for $name {
            fn parser_dialect(&self) -> &dyn Dialect {
                &self.dialect
            }

            fn name(&self) -> &'static str {
                $label
            }

            fn settings(&self) -> &DialectSettings {
                &self.settings
            }

            fn formatters(&self) -> &FormatterRegistry {
                &self.formatters
            }
        }
    };
}

builtin_dialect!(
    /// ANSI SQL dialect; table qualifiers are rejected
    GenericDialect,
    SqlParserGeneric,
    "generic",
    []
);

builtin_dialect!(
    /// PostgreSQL dialect; renders a `schema` qualifier
    PostgreSqlDialect,
    SqlParserPostgres,
    "postgresql",
    ["schema"]
);

builtin_dialect!(
    /// DuckDB SQL dialect; renders a `schema` qualifier
    DuckDbDialect,
    SqlParserDuckDb,
    "duckdb",
    ["schema"]
);

builtin_dialect!(
    /// SQLite dialect; table qualifiers are rejected
    SqliteDialect,
    SqlParserSqlite,
    "sqlite",
    []
);

/// Look up a built-in dialect by name
pub fn dialect_by_name(name: &str) -> SqlResult<Box<dyn SqlDialect>> {
    dialect_with_settings(name, None)
}

/// Build a built-in dialect, replacing its settings when given.
///
/// Supplied settings keep the dialect's supported qualifiers.
pub(crate) fn dialect_with_settings(
    name: &str,
    settings: Option<DialectSettings>,
) -> SqlResult<Box<dyn SqlDialect>> {
    fn build<D: SqlDialect + 'static>(
        base: D,
        settings: Option<DialectSettings>,
        with_settings: fn(DialectSettings) -> D,
    ) -> Box<dyn SqlDialect> {
        match settings {
            None => Box::new(base),
            Some(mut s) => {
                s.supported_qualifiers = base.settings().supported_qualifiers.clone();
                Box::new(with_settings(s))
            }
        }
    }

    let dialect = match name.to_ascii_lowercase().as_str() {
        "generic" | "ansi" => build(
            GenericDialect::new(),
            settings,
            GenericDialect::with_settings,
        ),
        "postgresql" | "postgres" => build(
            PostgreSqlDialect::new(),
            settings,
            PostgreSqlDialect::with_settings,
        ),
        "duckdb" => build(DuckDbDialect::new(), settings, DuckDbDialect::with_settings),
        "sqlite" => build(SqliteDialect::new(), settings, SqliteDialect::with_settings),
        _ => return Err(SqlError::UnknownDialect(name.to_string())),
    };
    Ok(dialect)
}

#[cfg(test)]
#[path = "dialect_test.rs"]
mod tests;
