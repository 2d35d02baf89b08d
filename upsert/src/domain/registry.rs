//! Process-wide cache of merge routines keyed by signature.
//!
//! Resolved routines live in a read-mostly map so cache hits for unrelated
//! signatures never wait on each other. A miss takes a per-signature creation
//! lock, re-checks the map, then validates and creates. Only a successful
//! resolution is cached, so a failed validation or creation can be retried
//! by the caller with corrected input. Creation locks are dropped once a
//! signature is resolved or its last contender has failed, so the lock map
//! only holds signatures currently being resolved.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, info, warn};

use super::error::UpsertError;
use super::merge_function::{MergeFunction, MergeFunctionSignature};
use super::ports::{RoutineCreator, RoutineExecutor, TableContext};
use super::row::Row;
use super::schema::{referenced_columns, validate_columns};

type CreationLock = Arc<Mutex<()>>;

/// Registry resolving rows to their merge routines.
///
/// Construct one per process (or per connection pool) and share it; routines
/// are never evicted.
pub struct MergeRoutineRegistry<C, E> {
    creator: Arc<C>,
    executor: Arc<E>,
    resolved: RwLock<HashMap<MergeFunctionSignature, Arc<MergeFunction>>>,
    creation_locks: Mutex<HashMap<MergeFunctionSignature, CreationLock>>,
}

impl<C, E> MergeRoutineRegistry<C, E> {
    /// Create an empty registry backed by the given collaborators.
    pub fn new(creator: Arc<C>, executor: Arc<E>) -> Self {
        Self {
            creator,
            executor,
            resolved: RwLock::new(HashMap::new()),
            creation_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Number of resolved routines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resolved
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no routine has been resolved yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `signature` has been resolved.
    #[must_use]
    pub fn contains(&self, signature: &MergeFunctionSignature) -> bool {
        self.cached(signature).is_some()
    }

    fn cached(&self, signature: &MergeFunctionSignature) -> Option<Arc<MergeFunction>> {
        self.resolved
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(signature)
            .cloned()
    }

    fn creation_lock(&self, signature: &MergeFunctionSignature) -> CreationLock {
        let mut locks = self
            .creation_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(signature.clone()).or_default())
    }

    fn store(&self, routine: &Arc<MergeFunction>) {
        self.resolved
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(routine.signature().clone(), Arc::clone(routine));
        // Later callers hit `resolved`; waiters on the old lock re-check it.
        self.creation_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(routine.signature());
    }

    /// Drop the creation lock of a failed resolution unless another caller
    /// is already waiting on it. Must be called while `lock` is held.
    fn release_failed(&self, signature: &MergeFunctionSignature, lock: &CreationLock) {
        let mut locks = self
            .creation_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // One reference lives in the map and one is ours; any other belongs
        // to a waiter that will retry under this same lock.
        if Arc::strong_count(lock) <= 2 {
            locks.remove(signature);
        }
    }
}

impl<C, E> MergeRoutineRegistry<C, E>
where
    C: RoutineCreator,
    E: RoutineExecutor,
{
    /// Resolve the merge routine for `row` against `table`, creating it on
    /// first use.
    ///
    /// A cached routine is returned unchanged; options carried by `row` do
    /// not replace the options of the row that first resolved it.
    ///
    /// # Errors
    ///
    /// - [`UpsertError::EmptyRow`] when the row names no columns at all.
    /// - [`UpsertError::TableContext`] when the table cannot be described.
    /// - [`UpsertError::InvalidColumns`] when selector, setter or
    ///   `ignore_on_update` name unknown columns; nothing is created.
    /// - [`UpsertError::RoutineCreation`] when the creator fails.
    ///
    /// None of these cache the signature.
    pub fn resolve<T>(&self, row: &Row, table: &T) -> Result<Arc<MergeFunction>, UpsertError>
    where
        T: TableContext + ?Sized,
    {
        let signature =
            MergeFunctionSignature::for_row(table.table_name(), row).in_schema(table.schema_name());
        if signature.setter_keys().is_empty() {
            warn!(table = signature.table_name(), "row names no columns");
            return Err(UpsertError::EmptyRow {
                table: signature.table_name().to_owned(),
            });
        }
        if let Some(routine) = self.cached(&signature) {
            debug!(table = signature.table_name(), "merge routine cache hit");
            return Ok(routine);
        }

        let lock = self.creation_lock(&signature);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(routine) = self.cached(&signature) {
            debug!(
                table = signature.table_name(),
                "merge routine resolved while waiting"
            );
            return Ok(routine);
        }

        debug!(table = signature.table_name(), "merge routine cache miss");
        match self.build(signature.clone(), row, table) {
            Ok(built) => {
                let routine = Arc::new(built);
                self.store(&routine);
                Ok(routine)
            }
            Err(error) => {
                self.release_failed(&signature, &lock);
                Err(error)
            }
        }
    }

    fn build<T>(
        &self,
        signature: MergeFunctionSignature,
        row: &Row,
        table: &T,
    ) -> Result<MergeFunction, UpsertError>
    where
        T: TableContext + ?Sized,
    {
        let columns = table.column_definitions()?;
        let possible: Vec<String> = columns.iter().map(|column| column.name.clone()).collect();
        let ignored: Vec<String> = row.ignore_on_update().into_iter().collect();
        let referenced = referenced_columns([
            signature.selector_keys(),
            signature.setter_keys(),
            ignored.as_slice(),
        ]);
        if let Err(source) = validate_columns(&referenced, &possible) {
            warn!(
                table = signature.table_name(),
                columns = ?source.columns,
                "merge routine rejected unknown columns"
            );
            return Err(UpsertError::invalid_columns(signature.table_name(), source));
        }

        let assume_exists = table.assume_routine_exists();
        let routine = MergeFunction::new(
            signature,
            table.quoted_table_name(),
            row.options().clone(),
            assume_exists,
        );

        if assume_exists {
            info!(
                routine = routine.name(),
                "merge routine assumed to exist; creation skipped"
            );
            return Ok(routine);
        }

        if let Err(error) = self.creator.create_routine(&routine, &columns) {
            warn!(routine = routine.name(), %error, "merge routine creation failed");
            return Err(error.into());
        }
        info!(
            routine = routine.name(),
            table = routine.table_name(),
            "merge routine created"
        );
        Ok(routine)
    }

    /// Run `row` through `routine`.
    ///
    /// # Errors
    ///
    /// - [`UpsertError::RowShapeMismatch`] when `row` has other key-sets
    ///   than `routine` was resolved for.
    /// - [`UpsertError::RoutineExecution`] when the executor fails.
    pub fn execute(&self, routine: &MergeFunction, row: &Row) -> Result<(), UpsertError> {
        if !routine.accepts(row) {
            return Err(UpsertError::RowShapeMismatch {
                routine: routine.name().to_owned(),
                expected_selector: routine.selector_keys().to_vec(),
                expected_setter: routine.setter_keys().to_vec(),
                actual_selector: row.selector_keys(),
                actual_setter: row.setter_keys(),
            });
        }

        let arguments = routine.arguments_for(row);
        self.executor.execute_routine(routine, &arguments)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
