use minijinja::Environment;
use oasgen_core::GeneratorError;
use serde::Serialize;

pub const DEFINITION: &str = "definition.ts.j2";
pub const REQUEST_TYPES: &str = "request_types.ts.j2";
pub const CLIENT: &str = "client.ts.j2";

const SOURCES: [(&str, &str); 3] = [
    (DEFINITION, include_str!("../templates/definition.ts.j2")),
    (REQUEST_TYPES, include_str!("../templates/request_types.ts.j2")),
    (CLIENT, include_str!("../templates/client.ts.j2")),
];

/// Escape `*/` sequences that would prematurely close JSDoc comment blocks,
/// and keep continuation lines inside the block.
fn escape_jsdoc(value: String) -> String {
    value.replace("*/", "*\\/").replace('\n', "\n * ")
}

/// The embedded template set. Built once per generation and shared by the
/// parallel renders.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, GeneratorError> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.add_filter("escape_jsdoc", escape_jsdoc);
        for (name, source) in SOURCES {
            env.add_template(name, source).map_err(render_error)?;
        }
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, GeneratorError> {
        let template = self.env.get_template(name).map_err(render_error)?;
        template.render(ctx).map_err(render_error)
    }
}

fn render_error(err: minijinja::Error) -> GeneratorError {
    GeneratorError::Render(err.to_string())
}
