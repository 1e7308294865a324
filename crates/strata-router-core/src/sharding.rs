//! Sharding routing stage
//!
//! Seeds the route context with every physical placement of the tables a
//! statement touches. Predicate-based narrowing is done by sharding
//! algorithms upstream; this stage covers the broadcast / full-table case.
//!
//! # Seeding Decision Tree
//!
//! ```text
//! Statement names tables? ──No──► Names an index? ──Yes──► owner from schema ─┐
//!        │                              │                        │            │
//!       Yes                             No                   unresolved       │
//!        │                              └───────────┬────────────┘            │
//!        │                                          ▼                         │
//!        │                     one unit per datasource, no table mappers      │
//!        │                                                                    │
//!        ▼◄───────────────────────── owner used as the logic table ───────────┘
//! for each logic table
//!   broadcast? ──Yes──► one unit per datasource (T → T)
//!        │
//!        No
//!        ▼
//!   one unit per actual data node (T → T_n)
//! ```

use strata_types::{
    IndexOwnerLookup, RouteContext, RouteMapper, RouteUnit, ShardingRule, StatementContext,
};
use tracing::{debug, trace};

use crate::error::RoutingError;
use crate::router::SqlRouter;
use crate::types::SHARDING_ORDER;

/// Broadcast routing engine for tables
pub struct TableBroadcastRoutingEngine<'a> {
    rule: &'a ShardingRule,
    schema: &'a dyn IndexOwnerLookup,
    statement: &'a StatementContext,
}

impl<'a> TableBroadcastRoutingEngine<'a> {
    pub fn new(
        rule: &'a ShardingRule,
        schema: &'a dyn IndexOwnerLookup,
        statement: &'a StatementContext,
    ) -> Self {
        Self { rule, schema, statement }
    }

    /// Add route units for the statement to `route_context`
    pub fn route(&self, route_context: &mut RouteContext) -> Result<(), RoutingError> {
        let logic_tables = self.logic_table_names();
        if logic_tables.is_empty() {
            trace!(kind = %self.statement.kind, "No logic table, routing to every datasource");
            for data_source in self.rule.data_source_names() {
                route_context.push(RouteUnit::new(RouteMapper::identity(data_source.as_str()), vec![]));
            }
            return Ok(());
        }

        for logic_table in &logic_tables {
            if self.rule.is_broadcast_table(logic_table) {
                route_context.extend(self.broadcast_table_route_units(logic_table));
            } else {
                let units = self.all_route_units(logic_table)?;
                route_context.extend(units);
            }
        }
        Ok(())
    }

    /// Tables named by the statement, or the owners of the indexes it names
    fn logic_table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let candidates: Vec<String> = if !self.statement.table_names.is_empty() {
            self.statement.table_names.clone()
        } else {
            self.statement
                .index_names
                .iter()
                .filter_map(|index| {
                    let owner = self.schema.lookup_table_by_index(index);
                    if owner.is_none() {
                        debug!(index = %index, "Index owner not found in schema");
                    }
                    owner
                })
                .collect()
        };

        for name in candidates {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
                names.push(name);
            }
        }
        names
    }

    fn broadcast_table_route_units(&self, table: &str) -> Vec<RouteUnit> {
        self.rule
            .data_source_names()
            .iter()
            .map(|ds| {
                RouteUnit::new(
                    RouteMapper::identity(ds.as_str()),
                    vec![RouteMapper::identity(table)],
                )
            })
            .collect()
    }

    fn all_route_units(&self, logic_table: &str) -> Result<Vec<RouteUnit>, RoutingError> {
        let table_rule = self
            .rule
            .find_table_rule(logic_table)
            .ok_or_else(|| RoutingError::TableRuleNotFound(logic_table.to_string()))?;

        Ok(table_rule
            .actual_data_nodes
            .iter()
            .map(|node| {
                RouteUnit::new(
                    RouteMapper::identity(node.data_source_name.as_str()),
                    vec![RouteMapper::new(logic_table, node.table_name.as_str())],
                )
            })
            .collect())
    }
}

/// Sharding stage of the routing pipeline
#[derive(Debug, Clone)]
pub struct ShardingSqlRouter {
    rule: ShardingRule,
}

impl ShardingSqlRouter {
    pub fn new(rule: ShardingRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> &ShardingRule {
        &self.rule
    }
}

impl SqlRouter for ShardingSqlRouter {
    fn order(&self) -> i32 {
        SHARDING_ORDER
    }

    fn name(&self) -> &'static str {
        "Sharding"
    }

    fn create_route_context(
        &self,
        statement: &StatementContext,
        schema: &dyn IndexOwnerLookup,
    ) -> Result<RouteContext, RoutingError> {
        let mut route_context = RouteContext::new();
        TableBroadcastRoutingEngine::new(&self.rule, schema, statement).route(&mut route_context)?;
        debug!(
            kind = %statement.kind,
            units = route_context.len(),
            "Sharding route context created"
        );
        Ok(route_context)
    }

    fn decorate_route_context(
        &self,
        _route_context: &mut RouteContext,
        _statement: &StatementContext,
        _schema: &dyn IndexOwnerLookup,
    ) -> Result<(), RoutingError> {
        // Sharding always seeds; nothing runs before it to decorate.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_types::{SchemaMetaData, ShardingRuleConfig, TableMetaData, TableRule};

    fn rule() -> ShardingRule {
        ShardingRule::new(ShardingRuleConfig {
            data_source_names: vec!["ds0".into(), "ds1".into(), "ds2".into()],
            tables: vec![
                TableRule::from_inline("t_order", "ds0.t_order_0, ds1.t_order_1").unwrap(),
                TableRule::from_inline("t_item", "ds0.t_item_0, ds0.t_item_1").unwrap(),
            ],
            broadcast_tables: vec!["t_config".into(), "t_dict".into()],
        })
        .unwrap()
    }

    fn route(statement: &StatementContext, schema: &SchemaMetaData) -> Result<RouteContext, RoutingError> {
        ShardingSqlRouter::new(rule()).create_route_context(statement, schema)
    }

    #[test]
    fn test_broadcast_table_routes_to_every_data_source() {
        let ctx = route(&StatementContext::select(&["t_config"]), &SchemaMetaData::new()).unwrap();

        assert_eq!(ctx.len(), 3);
        for (unit, ds) in ctx.route_units().iter().zip(["ds0", "ds1", "ds2"]) {
            assert_eq!(unit.data_source_mapper, RouteMapper::identity(ds));
            assert_eq!(unit.table_mappers, vec![RouteMapper::identity("t_config")]);
        }
    }

    #[test]
    fn test_sharded_table_full_route() {
        let ctx = route(&StatementContext::select(&["t_order"]), &SchemaMetaData::new()).unwrap();

        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.route_units()[0].data_source_mapper, RouteMapper::identity("ds0"));
        assert_eq!(ctx.route_units()[0].table_mappers, vec![RouteMapper::new("t_order", "t_order_0")]);
        assert_eq!(ctx.route_units()[1].data_source_mapper, RouteMapper::identity("ds1"));
        assert_eq!(ctx.route_units()[1].table_mappers, vec![RouteMapper::new("t_order", "t_order_1")]);
    }

    #[test]
    fn test_two_nodes_on_one_data_source_stay_separate() {
        let ctx = route(&StatementContext::select(&["t_item"]), &SchemaMetaData::new()).unwrap();

        assert_eq!(ctx.len(), 2);
        assert!(ctx.route_units().iter().all(|u| u.actual_data_source() == "ds0"));
    }

    #[test]
    fn test_broadcast_tables_combine_per_data_source() {
        let ctx = route(&StatementContext::select(&["t_config", "t_dict"]), &SchemaMetaData::new()).unwrap();

        assert_eq!(ctx.len(), 3);
        for unit in ctx.route_units() {
            let tables: Vec<_> = unit.logic_table_names().collect();
            assert_eq!(tables, vec!["t_config", "t_dict"]);
        }
    }

    #[test]
    fn test_untargeted_statement() {
        let statement = StatementContext::new(strata_types::StatementKind::Other);
        let ctx = route(&statement, &SchemaMetaData::new()).unwrap();

        assert_eq!(ctx.actual_data_source_names(), vec!["ds0", "ds1", "ds2"]);
        assert!(ctx.route_units().iter().all(|u| u.table_mappers.is_empty()));
    }

    #[test]
    fn test_drop_index_resolves_owner_from_schema() {
        let mut schema = SchemaMetaData::new();
        schema.put("t_order", TableMetaData::with_indexes(&["idx_order_user"]));

        let ctx = route(&StatementContext::drop_index(&["idx_order_user"]), &schema).unwrap();

        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.route_units()[1].actual_table_name("t_order"), Some("t_order_1"));
    }

    #[test]
    fn test_drop_unknown_index_routes_untargeted() {
        let ctx = route(&StatementContext::drop_index(&["idx_missing"]), &SchemaMetaData::new()).unwrap();

        assert_eq!(ctx.len(), 3);
        assert!(ctx.route_units().iter().all(|u| u.table_mappers.is_empty()));
    }

    #[test]
    fn test_unknown_table_is_routing_error() {
        let err = route(&StatementContext::insert("t_unknown"), &SchemaMetaData::new()).unwrap_err();
        assert!(matches!(err, RoutingError::TableRuleNotFound(t) if t == "t_unknown"));
    }
}
