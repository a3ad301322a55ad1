//! Configuration generation from a template and a data file.
//!
//! Rendering is delegated to minijinja and data loading to serde_yaml.
//! The template search path is the template file's own directory, so
//! includes resolve relative to the template.

use std::fs::File;
use std::path::Path;

use log::info;
use minijinja::{Environment, context, path_loader};

use crate::error::{Error, Result};

/// Render `template_path` against the data in `data_path` and return
/// the result as individual lines.
///
/// The loaded data is exposed to the template under the `config` name:
/// a template `hostname {{ config.name }}` with data `name: r1` renders
/// to `hostname r1`.
pub fn generate_config(template_path: &Path, data_path: &Path) -> Result<Vec<String>> {
    let data: serde_yaml::Value = serde_yaml::from_reader(File::open(data_path)?)?;

    let search_dir = template_path.parent().unwrap_or_else(|| Path::new("."));
    let template_name = template_path
        .file_name()
        .ok_or_else(|| {
            Error::Command(format!(
                "Not a template file: {}",
                template_path.display()
            ))
        })?
        .to_string_lossy()
        .into_owned();

    let mut env = Environment::new();
    env.set_loader(path_loader(search_dir));
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);

    let rendered = env
        .get_template(&template_name)?
        .render(context! { config => data })?;

    info!("{rendered}");
    Ok(rendered.split('\n').map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn renders_single_line_template() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_file(dir.path(), "hostname.j2", "hostname {{ config.name }}");
        let data = write_file(dir.path(), "data.yaml", "name: r1\n");

        let lines = generate_config(&template, &data).unwrap();
        assert_eq!(lines, vec!["hostname r1".to_string()]);
    }

    #[test]
    fn renders_loops_over_nested_data() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_file(
            dir.path(),
            "interfaces.j2",
            "{% for intf in config.interfaces %}\n\
             interface {{ intf.name }}\n\
             description {{ intf.desc }}\n\
             {% endfor %}\n",
        );
        let data = write_file(
            dir.path(),
            "data.yaml",
            "interfaces:\n  - name: Gi0/0\n    desc: uplink\n  - name: Gi0/1\n    desc: access\n",
        );

        let lines = generate_config(&template, &data).unwrap();
        assert_eq!(
            lines,
            vec![
                "interface Gi0/0".to_string(),
                "description uplink".to_string(),
                "interface Gi0/1".to_string(),
                "description access".to_string(),
                String::new(),
            ]
        );
    }

    #[test]
    fn missing_data_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_file(dir.path(), "t.j2", "x");
        let err = generate_config(&template, &dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
