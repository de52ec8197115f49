//! Per-request entry point tying filter translation and partition planning together.

use crate::assembler::QueryAssembler;
use crate::catalog::TupleDescriptor;
use crate::filter::ParseError;
use crate::partition::{
    Fragment, PartitionOptions, PartitionPlanner, PartitionSpec, PlannerConfig, PlanningError,
};
use crate::translator::{translate_filter, Pushdown};
use log::{debug, warn};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid filter: {0}")]
    Parse(#[from] ParseError),

    #[error("Invalid partitioning: {0}")]
    Planning(#[from] PlanningError),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Everything the engine needs about one external-table scan.
#[derive(Debug, Clone, Default)]
pub struct PushdownRequest {
    pub tuple: TupleDescriptor,
    pub filter: Option<String>,
    pub partition: Option<PartitionOptions>,
}

impl PushdownRequest {
    pub fn new(tuple: TupleDescriptor) -> Self {
        Self {
            tuple,
            filter: None,
            partition: None,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_partition(mut self, partition: PartitionOptions) -> Self {
        self.partition = Some(partition);
        self
    }

    /// Take partitioning from a request option map (`PARTITION_BY`, `RANGE`, `INTERVAL`).
    pub fn with_options(mut self, options: &HashMap<String, String>) -> EngineResult<Self> {
        self.partition = PartitionOptions::from_options(options)?;
        Ok(self)
    }

    /// Translate the filter and plan fragments, eagerly.
    pub fn plan(&self, config: &PlannerConfig) -> EngineResult<ScanPlan> {
        let pushdown = translate_filter(self.filter.as_deref(), &self.tuple)?;
        if let Some(Pushdown::Unsupported(reason)) = &pushdown {
            warn!("Filter is not pushed down: {}", reason);
        }

        let spec = self
            .partition
            .as_ref()
            .map(|options| PartitionSpec::parse(options, &self.tuple))
            .transpose()?;
        let fragments = PartitionPlanner::new(*config).plan(spec.as_ref())?;

        Ok(ScanPlan {
            pushdown,
            fragments,
        })
    }
}

/// Final text of one fragment's query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentQuery {
    pub index: usize,
    pub query: String,
}

/// Result of planning a request.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanPlan {
    /// `None` when the request carried no filter at all
    pub pushdown: Option<Pushdown>,
    pub fragments: Vec<Fragment>,
}

impl ScanPlan {
    pub fn where_clause(&self) -> Option<&str> {
        self.pushdown.as_ref().and_then(Pushdown::where_clause)
    }

    pub fn query_for(&self, base: &str, fragment: &Fragment) -> EngineResult<String> {
        let assembler = QueryAssembler::new(base).with_filter(self.where_clause());
        Ok(assembler.assemble_fragment(fragment)?)
    }

    /// One query per fragment, in fragment order.
    pub fn queries(&self, base: &str) -> EngineResult<Vec<FragmentQuery>> {
        let queries = self
            .fragments
            .iter()
            .map(|fragment| {
                Ok(FragmentQuery {
                    index: fragment.index(),
                    query: self.query_for(base, fragment)?,
                })
            })
            .collect::<EngineResult<Vec<_>>>()?;
        debug!("Assembled {} fragment queries", queries.len());
        Ok(queries)
    }
}
