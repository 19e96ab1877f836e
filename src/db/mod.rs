pub mod connection;
pub mod properties;

pub use connection::{init_db, Database};
pub use properties::{
    count_properties, insert_properties, recent_properties, PersistedProperty, PROPERTY_COLUMNS,
};
