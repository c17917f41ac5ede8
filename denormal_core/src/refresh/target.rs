use std::fmt;
use std::str::FromStr;

use crate::error::DenormalError;

/// One column to refresh on one table, written `table.column`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub table: String,
    pub column: String,
}

impl Target {
    /// Splits on the last `.`, so `app.Model.field` names column `field`
    /// of table `app.Model`.
    pub fn parse(raw: &str) -> Result<Self, DenormalError> {
        match raw.rsplit_once('.') {
            Some((table, column)) if !table.is_empty() && !column.is_empty() => Ok(Self {
                table: table.to_string(),
                column: column.to_string(),
            }),
            _ => Err(DenormalError::MalformedTarget(raw.to_string())),
        }
    }
}

impl FromStr for Target {
    type Err = DenormalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// Columns requested for one table, in the order they were given
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableGroup {
    pub table: String,
    pub columns: Vec<String>,
}

/// Parses every target and groups columns by table.
///
/// Tables keep first-seen order and repeated columns are kept as given.
/// Any malformed target fails the whole call.
pub fn group_targets<S: AsRef<str>>(targets: &[S]) -> Result<Vec<TableGroup>, DenormalError> {
    let mut groups: Vec<TableGroup> = Vec::new();
    for raw in targets {
        let target = Target::parse(raw.as_ref())?;
        match groups.iter_mut().find(|g| g.table == target.table) {
            Some(group) => group.columns.push(target.column),
            None => groups.push(TableGroup {
                table: target.table,
                columns: vec![target.column],
            }),
        }
    }
    Ok(groups)
}
