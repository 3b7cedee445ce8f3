use serde::Serialize;

/// How listings are printed on stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns for humans.
    #[default]
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Serializes `value` in this format, or renders it with `table` for
    /// [`OutputFormat::Table`].
    pub fn render<T, F>(self, value: &T, table: F) -> Result<String, RenderError>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&T) -> String,
    {
        match self {
            Self::Table => Ok(table(value)),
            Self::Json => Ok(serde_json::to_string_pretty(value)?),
            Self::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }
}

#[derive(Debug, snafu::Snafu)]
pub enum RenderError {
    #[snafu(display("Failed to serialize output as JSON, error: {source}"), context(false))]
    Json { source: serde_json::Error },

    #[snafu(display("Failed to serialize output as YAML, error: {source}"), context(false))]
    Yaml { source: serde_yaml::Error },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        name: &'static str,
    }

    #[test]
    fn test_render() {
        let sample = Sample { name: "backup" };
        let table = |sample: &Sample| format!("NAME\n{}", sample.name);

        assert_eq!(OutputFormat::Table.render(&sample, table).unwrap(), "NAME\nbackup");
        assert_eq!(
            OutputFormat::Json.render(&sample, table).unwrap(),
            "{\n  \"name\": \"backup\"\n}"
        );
        assert_eq!(OutputFormat::Yaml.render(&sample, table).unwrap(), "name: backup\n");
    }
}
