mod capability;
pub use capability::Capability;

pub mod operation;
pub use operation::Operation;

mod response;
pub use response::{Response, Rows};

mod session;
pub use session::{Session, Tls};

use crate::{
    async_trait,
    schema::{Description, Schema},
};

use std::{fmt::Debug, sync::Arc};

#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    /// Describes the driver's capability, which informs statement planning.
    fn capability(&self) -> &'static Capability;

    /// Opens a connection. Pooling, if any, happens inside the driver.
    async fn connect(&self) -> crate::Result<Box<dyn Connection>>;
}

#[async_trait]
pub trait Connection: Debug + Send + 'static {
    fn capability(&self) -> &'static Capability;

    /// Execute a database operation
    async fn exec(&mut self, schema: &Arc<Schema>, op: Operation) -> crate::Result<Response>;

    /// Reads the system catalogues of the connected database.
    async fn describe(&mut self) -> crate::Result<Description>;
}
