pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;

/// Length of a full hex object id (SHA-1).
pub const OBJECT_ID_LENGTH: usize = 40;
