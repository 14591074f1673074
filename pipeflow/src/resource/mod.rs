//! Step-scoped database resources.
//!
//! A [`ResourceScope`] owns one SQLite connection for the duration of a
//! single step invocation. The connection is released exactly once: either
//! explicitly through [`ResourceScope::release`], which reports close
//! errors, or by `Drop` on any other exit path.

mod schema;

pub use schema::TableSchema;

use crate::errors::ResourceError;
use rusqlite::Connection;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Locator that opens a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// Callback invoked with the locator each time a scope releases its handle.
pub type ReleaseHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Declares that a step needs a resource.
#[derive(Clone)]
pub struct ResourceSpec {
    locator: String,
    schema: Option<TableSchema>,
    on_release: Option<ReleaseHook>,
}

impl ResourceSpec {
    /// Creates a spec for the database at `locator`.
    #[must_use]
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            schema: None,
            on_release: None,
        }
    }

    /// Creates a spec for a private in-memory database.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(IN_MEMORY)
    }

    /// Sets the table schema applied on acquisition.
    #[must_use]
    pub fn with_schema(mut self, schema: TableSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Sets a callback observing every release.
    #[must_use]
    pub fn on_release<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_release = Some(Arc::new(hook));
        self
    }

    /// Returns the locator.
    #[must_use]
    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// Returns the table schema, if any.
    #[must_use]
    pub fn schema(&self) -> Option<&TableSchema> {
        self.schema.as_ref()
    }
}

impl fmt::Debug for ResourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceSpec")
            .field("locator", &self.locator)
            .field("schema", &self.schema)
            .field("on_release", &self.on_release.is_some())
            .finish()
    }
}

/// An open connection handed to a single step invocation.
#[derive(Debug)]
pub struct ResourceHandle {
    locator: String,
    conn: Connection,
}

impl ResourceHandle {
    /// Returns the locator the connection was opened from.
    #[must_use]
    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// Returns the underlying connection.
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Guarded acquisition of a [`ResourceHandle`].
pub struct ResourceScope {
    handle: Option<ResourceHandle>,
    on_release: Option<ReleaseHook>,
}

impl ResourceScope {
    /// Opens the database at `locator` and applies `schema` if given.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be opened or the schema
    /// cannot be applied. A connection opened before a schema failure is
    /// closed before returning.
    pub fn acquire(locator: &str, schema: Option<&TableSchema>) -> Result<Self, ResourceError> {
        Self::open(locator, schema, None)
    }

    /// Acquires the resource a step declared.
    ///
    /// # Errors
    ///
    /// See [`ResourceScope::acquire`].
    pub fn from_spec(spec: &ResourceSpec) -> Result<Self, ResourceError> {
        Self::open(&spec.locator, spec.schema.as_ref(), spec.on_release.clone())
    }

    fn open(
        locator: &str,
        schema: Option<&TableSchema>,
        on_release: Option<ReleaseHook>,
    ) -> Result<Self, ResourceError> {
        if let Some(schema) = schema {
            schema.validate()?;
        }

        let conn = open_connection(locator)?;
        let scope = Self {
            handle: Some(ResourceHandle {
                locator: locator.to_string(),
                conn,
            }),
            on_release,
        };

        // Dropping the scope on a schema failure releases the connection.
        if let Some(schema) = schema {
            scope.apply_schema(schema)?;
        }

        debug!(locator, "Resource acquired");
        Ok(scope)
    }

    /// Returns the handle while the scope is open.
    #[must_use]
    pub fn handle(&self) -> Option<&ResourceHandle> {
        self.handle.as_ref()
    }

    /// Closes the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite refuses to close the connection.
    pub fn release(mut self) -> Result<(), ResourceError> {
        self.close()
    }

    fn apply_schema(&self, schema: &TableSchema) -> Result<(), ResourceError> {
        let statement = schema.create_statement()?;
        if let Some(handle) = &self.handle {
            handle
                .conn
                .execute_batch(&statement)
                .map_err(|source| ResourceError::Schema {
                    locator: handle.locator.clone(),
                    table: schema.table.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), ResourceError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        let ResourceHandle { locator, conn } = handle;
        let result = conn.close().map_err(|(_conn, source)| ResourceError::Release {
            locator: locator.clone(),
            source,
        });

        if let Some(hook) = &self.on_release {
            hook(&locator);
        }
        debug!(locator = %locator, ok = result.is_ok(), "Resource released");
        result
    }
}

impl fmt::Debug for ResourceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceScope")
            .field("locator", &self.handle.as_ref().map(ResourceHandle::locator))
            .finish()
    }
}

impl Drop for ResourceScope {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(error = %err, "Failed to release resource");
        }
    }
}

fn open_connection(locator: &str) -> Result<Connection, ResourceError> {
    let opened = if locator == IN_MEMORY {
        Connection::open_in_memory()
    } else {
        Connection::open(locator)
    };

    opened.map_err(|source| ResourceError::Open {
        locator: locator.to_string(),
        source,
    })
}
