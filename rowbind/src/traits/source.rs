//! ConnectionSource trait

use crate::error::Result;
use crate::traits::Connection;

/// Supplies connection strings and constructs connections from them.
///
/// Implementations only construct; they never open sockets, retry or pool.
/// Opening happens inside [`StatementRunner`](crate::StatementRunner), which
/// also guarantees the matching close.
///
/// # Example
///
/// ```ignore
/// use rowbind::{ConnectionSettings, ConnectionSource, MySqlSource};
///
/// let source = MySqlSource::from_settings(ConnectionSettings::load(None)?);
/// let connection = source.default_connection()?; // constructed, not open
/// ```
pub trait ConnectionSource: Send + Sync {
    /// The connection type this source constructs.
    type Connection: Connection;

    /// The backend connection string.
    ///
    /// Fails with a configuration error if none is available.
    fn connection_string(&self) -> Result<String>;

    /// Construct a connection bound to `connection_string` without opening it.
    fn open_connection(&self, connection_string: &str) -> Result<Self::Connection>;

    /// Construct a connection from this source's own connection string.
    fn default_connection(&self) -> Result<Self::Connection> {
        let connection_string = self.connection_string()?;
        self.open_connection(&connection_string)
    }
}

impl<S: ConnectionSource + ?Sized> ConnectionSource for &S {
    type Connection = S::Connection;

    fn connection_string(&self) -> Result<String> {
        (**self).connection_string()
    }

    fn open_connection(&self, connection_string: &str) -> Result<Self::Connection> {
        (**self).open_connection(connection_string)
    }

    fn default_connection(&self) -> Result<Self::Connection> {
        (**self).default_connection()
    }
}
