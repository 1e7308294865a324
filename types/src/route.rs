//! Route context - the physical targets computed for one statement
//!
//! A `RouteContext` is built by the routing pipeline and consumed by the
//! execution unit builder. It is owned by a single routing operation and is
//! never shared across statements.

use serde::{Deserialize, Serialize};

/// Logical name to actual name mapping (datasource or table)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteMapper {
    /// Name as seen by the client
    pub logic_name: String,

    /// Physical name on the backend
    pub actual_name: String,
}

impl RouteMapper {
    pub fn new(logic_name: impl Into<String>, actual_name: impl Into<String>) -> Self {
        Self {
            logic_name: logic_name.into(),
            actual_name: actual_name.into(),
        }
    }

    /// Mapper whose logical and actual names are the same
    pub fn identity(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            logic_name: name.clone(),
            actual_name: name,
        }
    }
}

/// One physical target: a datasource plus the tables touched on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteUnit {
    pub data_source_mapper: RouteMapper,
    pub table_mappers: Vec<RouteMapper>,
}

impl RouteUnit {
    pub fn new(data_source_mapper: RouteMapper, table_mappers: Vec<RouteMapper>) -> Self {
        Self {
            data_source_mapper,
            table_mappers,
        }
    }

    /// Actual datasource this unit executes against
    pub fn actual_data_source(&self) -> &str {
        &self.data_source_mapper.actual_name
    }

    /// Logical datasource this unit was routed from
    pub fn logic_data_source(&self) -> &str {
        &self.data_source_mapper.logic_name
    }

    /// Find the table mapper for a logical table (ASCII case-insensitive)
    pub fn find_table_mapper(&self, logic_table: &str) -> Option<&RouteMapper> {
        self.table_mappers
            .iter()
            .find(|m| m.logic_name.eq_ignore_ascii_case(logic_table))
    }

    /// Actual table name for a logical table, if this unit maps it
    pub fn actual_table_name(&self, logic_table: &str) -> Option<&str> {
        self.find_table_mapper(logic_table).map(|m| m.actual_name.as_str())
    }

    pub fn logic_table_names(&self) -> impl Iterator<Item = &str> {
        self.table_mappers.iter().map(|m| m.logic_name.as_str())
    }

    /// Whether `other`'s table mappers can be folded into this unit without
    /// mapping one logical table twice.
    fn can_absorb(&self, other: &RouteUnit) -> bool {
        self.data_source_mapper == other.data_source_mapper
            && other.table_mappers.iter().all(|m| match self.find_table_mapper(&m.logic_name) {
                None => true,
                Some(existing) => existing == m,
            })
    }
}

/// Ordered collection of route units for one statement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteContext {
    route_units: Vec<RouteUnit>,
}

impl RouteContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route_units(&self) -> &[RouteUnit] {
        &self.route_units
    }

    pub fn route_units_mut(&mut self) -> &mut Vec<RouteUnit> {
        &mut self.route_units
    }

    pub fn into_route_units(self) -> Vec<RouteUnit> {
        self.route_units
    }

    pub fn is_empty(&self) -> bool {
        self.route_units.is_empty()
    }

    pub fn len(&self) -> usize {
        self.route_units.len()
    }

    /// Append a unit without any merging
    pub fn push(&mut self, unit: RouteUnit) {
        self.route_units.push(unit);
    }

    /// Add a unit, combining it with an existing unit on the same datasource
    /// when that does not map a logical table twice.
    ///
    /// Mappers already present in the target unit are not duplicated.
    pub fn put(&mut self, unit: RouteUnit) {
        match self.route_units.iter_mut().find(|u| u.can_absorb(&unit)) {
            Some(existing) => {
                for mapper in unit.table_mappers {
                    if !existing.table_mappers.contains(&mapper) {
                        existing.table_mappers.push(mapper);
                    }
                }
            }
            None => self.route_units.push(unit),
        }
    }

    pub fn extend(&mut self, units: impl IntoIterator<Item = RouteUnit>) {
        for unit in units {
            self.put(unit);
        }
    }

    /// Distinct actual datasource names, in first-seen order
    pub fn actual_data_source_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.route_units.len());
        for unit in &self.route_units {
            let name = unit.actual_data_source();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// True when the statement touches exactly one physical target
    pub fn is_single_routing(&self) -> bool {
        self.route_units.len() == 1
    }
}
