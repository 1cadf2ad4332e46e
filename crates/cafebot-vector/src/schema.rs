use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

/// LanceDB database directory under the index dir, and the table inside it.
pub const VECTOR_DIR: &str = "vectors";
pub const VECTOR_TABLE: &str = "vectors";
pub const META_FILE: &str = "meta.json";

pub fn build_vector_schema(dim: i32) -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new("ordinal", DataType::Int32, false),
		Field::new("vector", DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim), true),
	]))
}
