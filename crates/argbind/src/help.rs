//! Usage line rendering for the help short-circuit.

use crate::descriptor::Descriptor;
use crate::options::Registry;

/// Render `Usage: <program> <pos1> <pos2>...` followed by a newline.
///
/// Only positional fields appear, in declaration order, each under its
/// display name.
pub fn usage_line(program: &str, descriptors: &[Descriptor<'_>], registry: &Registry<'_>) -> String {
    let mut out = format!("Usage: {program}");
    for d in descriptors {
        let Descriptor::Field(field) = d else {
            continue;
        };
        let options = registry.get(field.name);
        if options.positional {
            out.push_str(&format!(" <{}>", options.display_name(field.name)));
        }
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::FieldOptions;

    #[test]
    fn lists_positionals_in_declared_order() {
        let mut input = String::new();
        let mut verbose = false;
        let mut output = String::new();
        let descriptors = vec![
            Descriptor::field("input", &mut input),
            Descriptor::options("input", FieldOptions::positional()),
            Descriptor::field("verbose", &mut verbose),
            Descriptor::field("output", &mut output),
            Descriptor::options("output", FieldOptions::positional().rename("OUT")),
        ];
        let registry = Registry::build(&descriptors).unwrap();
        assert_eq!(
            usage_line("tool", &descriptors, &registry),
            "Usage: tool <input> <OUT>\n"
        );
    }

    #[test]
    fn no_positionals_is_just_the_program() {
        let mut flag = 0i32;
        let descriptors = vec![Descriptor::field("flag", &mut flag)];
        let registry = Registry::build(&descriptors).unwrap();
        assert_eq!(usage_line("filename", &descriptors, &registry), "Usage: filename\n");
    }
}
