use schemata::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Identifier the example schema is registered under
pub const EXAMPLE_NAME: &str = "pets";

/// Two record types and the full set of query and mutation conventions
pub const EXAMPLE_SCHEMA: &str = r#"type Cat {
  id: ID!
  name: String!
  age: Int
  indoor: Boolean
}

type Bike {
  id: ID!
  model: String
  gears: Int
}

type Query {
  cats: [Cat!]!
  cat(id: ID!): Cat
  bikes: [Bike!]!
  bike(id: ID!): Bike
}

type Mutation {
  addCat(id: ID!, name: String!, age: Int, indoor: Boolean): Cat
  updateCat(id: ID!, name: String, age: Int, indoor: Boolean): Cat
  deleteCat(id: ID!): Cat
  addBike(id: ID!, model: String, gears: Int): Bike
  deleteBike(id: ID!): Bike
}
"#;

/// Write the example schema into the upload directory unless one is already there
pub fn write_example_schema(upload_dir: &Path, extension: &str) -> Result<PathBuf> {
    fs::create_dir_all(upload_dir)?;
    let path = upload_dir.join(format!("{}.{}", EXAMPLE_NAME, extension));
    if path.exists() {
        tracing::warn!("{} already exists, leaving it untouched", path.display());
    } else {
        fs::write(&path, EXAMPLE_SCHEMA)?;
    }
    Ok(path)
}
