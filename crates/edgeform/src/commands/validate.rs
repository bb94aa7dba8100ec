//! Offline validation of a JSON document against a resource schema.

use edgeform_core::{FormEngine, ResourceType, schema, validate};

use crate::cli::{GlobalOpts, ValidateArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub fn handle(args: &ValidateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let resource = ResourceType::from_name(&args.resource)?;
    let schema = schema(resource);
    let json = util::read_json_file(&args.from_file)?;
    let model = FormEngine::new(schema).from_resource(&json)?;

    validate(schema, &model).map_err(|errors| util::report_invalid(resource, &errors, global))?;

    if !global.quiet {
        eprintln!(
            "{}",
            output::status_line(
                true,
                &format!("{} is valid", args.from_file.display()),
                output::should_color(global.color),
            )
        );
    }
    Ok(())
}
