/// Schema text handling
///
/// Parses schema definition language into typed definitions and turns those
/// definitions into an executable dynamic GraphQL schema.

mod builder;
mod parser;
mod resolver;
mod scalars;
mod type_descriptor;
mod type_mapping;

pub use builder::SchemaBuilder;
pub use parser::{
    parse, ArgumentDefinition, EnumDefinition, FieldDefinition, ParsedSchema, TypeDefinition,
    MUTATION_ROOT, QUERY_ROOT,
};
pub use scalars::{is_valid_date, is_valid_datetime};
pub use type_descriptor::TypeDescriptor;
pub use type_mapping::{descriptor_to_type_ref, OutputCoercion};
