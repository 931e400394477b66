use clap::{Parser, Subcommand};

/// Terminal width assumed when `--width` and `COLUMNS` are both unset.
pub const DEFAULT_WIDTH: usize = 100;

#[derive(Debug, Parser)]
#[command(name = "verger")]
#[command(about = "Orchard administration console")]
pub struct Cli {
    /// Backend base URL; overrides `VERGER_API_URL`.
    #[arg(long, global = true)]
    pub api_url: Option<String>,
    /// Print JSON instead of text.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the entities this console manages.
    Entities,
    /// Show one page of a collection.
    List {
        entity: String,
        /// Case-insensitive substring matched against the search fields.
        #[arg(long, short)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// One of 5, 10, 25, 50; defaults to `VERGER_PAGE_SIZE`.
        #[arg(long)]
        page_size: Option<usize>,
        /// Output width; below 80 columns records are shown as cards.
        #[arg(long, env = "COLUMNS", default_value_t = DEFAULT_WIDTH)]
        width: usize,
    },
    /// Create a record.
    Create {
        entity: String,
        #[arg(long = "field", short = 'f', value_name = "KEY=VALUE", value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
    },
    /// Update the record identified by `id`.
    Update {
        entity: String,
        id: String,
        #[arg(long = "field", short = 'f', value_name = "KEY=VALUE", value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
    },
    /// Delete the record identified by `id`.
    Delete { entity: String, id: String },
    /// Check whether an identifier is still free.
    Check { entity: String, candidate: String },
}

/// Parse one `--field key=value` argument.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn assignment_splits_on_first_equals() {
        assert_eq!(
            parse_assignment("libelle=a=b"),
            Ok(("libelle".to_string(), "a=b".to_string()))
        );
        assert_eq!(
            parse_assignment(" code =PG1"),
            Ok(("code".to_string(), "PG1".to_string()))
        );
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn parses_create_with_repeated_fields() {
        let cli = Cli::try_parse_from([
            "verger",
            "create",
            "rootstock",
            "--field",
            "code=PG010",
            "-f",
            "libelle=Citrus volkameriana",
        ])
        .unwrap();
        let Command::Create { entity, fields } = cli.command else {
            panic!("expected create");
        };
        assert_eq!(entity, "rootstock");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].1, "Citrus volkameriana");
    }

    #[test]
    fn parses_list_options() {
        let cli = Cli::try_parse_from([
            "verger", "list", "orchard", "-s", "nord", "--page", "2", "--page-size", "25",
            "--width", "60", "--json",
        ])
        .unwrap();
        assert!(cli.json);
        let Command::List {
            search,
            page,
            page_size,
            width,
            ..
        } = cli.command
        else {
            panic!("expected list");
        };
        assert_eq!(search.as_deref(), Some("nord"));
        assert_eq!((page, page_size, width), (2, Some(25), 60));
    }
}
