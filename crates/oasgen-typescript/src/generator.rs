use log::{debug, info};
use oasgen_core::config::{ABSENT_TYPE, GenerationOptions};
use oasgen_core::ir::IrSpec;
use oasgen_core::{CodeGenerator, GeneratedFile, GeneratorError};

use crate::emitters;
use crate::emitters::client::CLIENT_FILE;
use crate::emitters::request_types::REQUEST_TYPES_FILE;
use crate::templates::Templates;

/// io-ts model, request type and client generator.
pub struct TypeScriptGenerator;

impl TypeScriptGenerator {
    /// Default response types must name a generated definition or be
    /// the absent-payload sentinel.
    fn check_default_types(ir: &IrSpec, options: &GenerationOptions) -> Result<(), GeneratorError> {
        for (option, ty) in [
            ("default_success_type", &options.default_success_type),
            ("default_error_type", &options.default_error_type),
        ] {
            if ty != ABSENT_TYPE && !ir.definitions.contains_key(ty) {
                return Err(GeneratorError::Options(format!(
                    "{option} `{ty}` is not a definition of the document"
                )));
            }
        }
        Ok(())
    }
}

impl CodeGenerator for TypeScriptGenerator {
    fn generate(
        &self,
        ir: &IrSpec,
        options: &GenerationOptions,
    ) -> Result<Vec<GeneratedFile>, GeneratorError> {
        let options = options.clone().normalized();
        if options.request_types {
            Self::check_default_types(ir, &options)?;
        }
        let templates = Templates::new()?;

        let mut files = emitters::definitions::emit_definitions(ir, &options, &templates)?;
        debug!("rendered {} definition modules", files.len());

        if options.request_types {
            files.push(GeneratedFile {
                path: REQUEST_TYPES_FILE.to_string(),
                content: emitters::request_types::render_request_types(
                    &ir.operations,
                    &ir.definitions,
                    &options,
                    &templates,
                )?,
            });
        }
        if options.client {
            files.push(GeneratedFile {
                path: CLIENT_FILE.to_string(),
                content: emitters::client::render_client(
                    &ir.operations,
                    &ir.meta,
                    &options,
                    &templates,
                )?,
            });
        }

        info!("generated {} files for {}", files.len(), ir.meta.title);
        Ok(files)
    }
}
