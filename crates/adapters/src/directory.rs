//! In-memory student directory backed by hash indexes.

use crate::dataset::{DatasetError, LocatedRecord, builtin_records, in_dataset_order};
use results_portal_domain::{NameKey, StudentRecord, Usn};
use results_portal_ports::{
    BoxFuture, DirectoryInfo, StudentDirectoryPort, StudentHandle,
};
use results_portal_shared::{ErrorEnvelope, RequestContext, Result};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Immutable record index keyed by normalized seat number and name.
#[derive(Debug, Default)]
pub struct DirectoryIndex {
    by_usn: FxHashMap<Box<str>, StudentHandle>,
    by_name: FxHashMap<Box<str>, StudentHandle>,
    sorted: Vec<StudentHandle>,
}

impl DirectoryIndex {
    /// Build an index from records in dataset order.
    ///
    /// Duplicate seat numbers are rejected; duplicate names keep the first record.
    pub fn build(records: Vec<StudentRecord>) -> std::result::Result<Self, DatasetError> {
        Self::build_located(in_dataset_order(records))
    }

    /// Build an index from parsed records, reporting a duplicate seat number
    /// at the source location of its second occurrence.
    pub fn build_located(
        records: Vec<LocatedRecord>,
    ) -> std::result::Result<Self, DatasetError> {
        let mut by_usn = FxHashMap::default();
        let mut by_name = FxHashMap::default();
        by_usn.reserve(records.len());
        by_name.reserve(records.len());

        for LocatedRecord { location, record } in records {
            let handle = Arc::new(record);
            let usn_key: Box<str> = handle.usn.as_str().into();
            if by_usn.contains_key(&usn_key) {
                return Err(DatasetError::DuplicateUsn { location });
            }
            if let Ok(name) = handle.name_key() {
                by_name
                    .entry(name.as_str().into())
                    .or_insert_with(|| Arc::clone(&handle));
            }
            by_usn.insert(usn_key, handle);
        }

        let mut sorted: Vec<StudentHandle> = by_usn.values().cloned().collect();
        sorted.sort_by(|left, right| left.usn.cmp(&right.usn));

        Ok(Self {
            by_usn,
            by_name,
            sorted,
        })
    }

    /// Record with the given seat number.
    #[must_use]
    pub fn by_usn(&self, usn: &Usn) -> Option<StudentHandle> {
        self.by_usn.get(usn.as_str()).cloned()
    }

    /// First record whose name normalizes to `name`.
    #[must_use]
    pub fn by_name(&self, name: &NameKey) -> Option<StudentHandle> {
        self.by_name.get(name.as_str()).cloned()
    }

    /// All records ordered by seat number.
    #[must_use]
    pub fn sorted(&self) -> Vec<StudentHandle> {
        self.sorted.clone()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// True when the index holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }
}

/// Directory over a fixed set of records.
pub struct InMemoryStudentDirectory {
    info: DirectoryInfo,
    index: DirectoryIndex,
}

impl InMemoryStudentDirectory {
    /// Wrap a prebuilt index.
    #[must_use]
    pub const fn new(info: DirectoryInfo, index: DirectoryIndex) -> Self {
        Self { info, index }
    }

    /// Directory over the compiled-in records.
    pub fn builtin() -> Result<Self> {
        let records = builtin_records().map_err(ErrorEnvelope::from)?;
        let index = DirectoryIndex::build(records).map_err(ErrorEnvelope::from)?;
        Ok(Self::new(DirectoryInfo::builtin(), index))
    }

    /// Directory over caller-supplied records.
    pub fn from_records(info: DirectoryInfo, records: Vec<StudentRecord>) -> Result<Self> {
        let index = DirectoryIndex::build(records).map_err(ErrorEnvelope::from)?;
        Ok(Self::new(info, index))
    }
}

impl StudentDirectoryPort for InMemoryStudentDirectory {
    fn info(&self) -> &DirectoryInfo {
        &self.info
    }

    fn find_by_usn(
        &self,
        ctx: &RequestContext,
        usn: Usn,
    ) -> BoxFuture<'_, Result<Option<StudentHandle>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("directory.find_by_usn")?;
            Ok(self.index.by_usn(&usn))
        })
    }

    fn find_by_name(
        &self,
        ctx: &RequestContext,
        name: NameKey,
    ) -> BoxFuture<'_, Result<Option<StudentHandle>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("directory.find_by_name")?;
            Ok(self.index.by_name(&name))
        })
    }

    fn list_students(&self, ctx: &RequestContext) -> BoxFuture<'_, Result<Vec<StudentHandle>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("directory.list_students")?;
            Ok(self.index.sorted())
        })
    }
}
