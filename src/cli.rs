use std::cmp;
use std::error::Error;

use atty::Stream;
use clap::{Parser, Subcommand};
use legalgloss_rs::{
    Category, Glossary, GlossaryEntry, MatchKind, MatchSpan, SearchConfig, Segment, TermMatcher,
};
use serde_json::json;
use termimad::{FmtText, MadSkin, terminal_size};

const SUGGESTION_LIMIT: usize = 3;

#[derive(Parser, Debug)]
#[command(name = "legalgloss-rs", about = "Explore the legal glossary", version)]
pub struct Cli {
    /// Emit JSON instead of human-readable tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Operations on glossary terms.
    #[command(subcommand)]
    Term(TermCommand),
    /// Serve the glossary over HTTP.
    #[cfg(feature = "web")]
    Serve {
        /// Address to bind.
        #[arg(long, env = "LEGALGLOSS_ADDR", default_value = "127.0.0.1:8080")]
        addr: std::net::SocketAddr,
        /// Public base URL used in generated links.
        #[arg(long, env = "LEGALGLOSS_BASE_URL")]
        base_url: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum TermCommand {
    /// Resolve terms or aliases to entry IDs.
    Get {
        /// One or more terms to look up.
        #[arg(required = true)]
        terms: Vec<String>,
    },
    /// Show the full entry for a term or alias.
    Show {
        /// Term or alias to display.
        term: String,
    },
    /// List entries, optionally filtered by category and text.
    List {
        /// Category slug (civil, penal, trabalho, comercial, constitucional, processual, familiar).
        #[arg(short, long)]
        category: Option<Category>,
        /// Text to look for in terms, definitions and aliases.
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// List terms and aliases that start with the provided prefix.
    Prefix {
        prefix: String,
        /// Maximum number of matches to return.
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Highlight glossary terms found in a text.
    Annotate {
        text: String,
        /// Report every raw match, overlaps included.
        #[arg(long)]
        all: bool,
    },
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Term(TermCommand::Get { terms }) => handle_get(terms, cli.json),
        Command::Term(TermCommand::Show { term }) => handle_show(term, cli.json),
        Command::Term(TermCommand::List { category, query }) => {
            handle_list(category, query, cli.json)
        }
        Command::Term(TermCommand::Prefix { prefix, limit }) => {
            handle_prefix(prefix, limit, cli.json)
        }
        Command::Term(TermCommand::Annotate { text, all }) => handle_annotate(text, all, cli.json),
        #[cfg(feature = "web")]
        Command::Serve { addr, base_url } => handle_serve(addr, base_url),
    }
}

fn handle_get(terms: Vec<String>, as_json: bool) -> Result<(), Box<dyn Error>> {
    let results: Vec<(String, Option<GlossaryEntry<'static>>)> = terms
        .into_iter()
        .map(|term| {
            let entry = Glossary::get(&term);
            (term, entry)
        })
        .collect();

    if as_json {
        let payload: Vec<_> = results
            .iter()
            .map(|(term, entry)| {
                json!({
                    "query": term,
                    "entry_id": entry.map(|e| e.id()),
                    "term": entry.map(|e| e.term()),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_lookup_table(&results);
    }
    Ok(())
}

fn handle_show(term: String, as_json: bool) -> Result<(), Box<dyn Error>> {
    let Some(entry) = Glossary::get(&term) else {
        return Err(not_found_message(&term).into());
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&entry_to_json(&entry))?);
    } else {
        print_entry(&entry);
    }
    Ok(())
}

fn not_found_message(term: &str) -> String {
    let suggestions = Glossary::suggest_terms(term, &SearchConfig::default(), SUGGESTION_LIMIT);
    if suggestions.is_empty() {
        format!("Nenhuma entrada para o termo {term:?}")
    } else {
        format!(
            "Nenhuma entrada para o termo {term:?}. Quis dizer: {}?",
            suggestions.join(", ")
        )
    }
}

fn handle_list(
    category: Option<Category>,
    query: String,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let entries = Glossary::filter(&query, category);
    if as_json {
        let payload = json!({
            "category": category.map(Category::slug),
            "query": query,
            "results": entries.iter().map(entry_to_json).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("Nenhum termo encontrado.");
        return Ok(());
    }
    let width = entries
        .iter()
        .map(|entry| entry.term().chars().count())
        .max()
        .unwrap_or(4)
        .max("TERMO".len());
    println!("{:<width$}  {}", "TERMO", "CATEGORIA", width = width);
    println!("{:-<width$}  {}", "", "---------", width = width);
    for entry in &entries {
        println!(
            "{:<width$}  {}",
            entry.term(),
            entry.category().label(),
            width = width
        );
    }
    Ok(())
}

fn handle_prefix(prefix: String, limit: usize, as_json: bool) -> Result<(), Box<dyn Error>> {
    let limit = cmp::max(1, limit);
    let matches = Glossary::prefix(&prefix, limit);

    if as_json {
        let payload = json!({
            "prefix": prefix,
            "limit": limit,
            "results": matches.iter().map(|(key, entry)| {
                json!({"key": key, "entry_id": entry.id(), "term": entry.term()})
            }).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }
    if matches.is_empty() {
        println!("Nenhum termo começa por \"{prefix}\".");
        return Ok(());
    }
    let width = matches
        .iter()
        .map(|(key, _)| key.chars().count())
        .max()
        .unwrap_or(prefix.len())
        .max("CHAVE".len());
    println!("Termos com o prefixo \"{prefix}\":");
    println!("{:<width$}  {}", "CHAVE", "TERMO", width = width);
    println!("{:-<width$}  {}", "", "-----", width = width);
    for (key, entry) in &matches {
        println!("{:<width$}  {}", key, entry.term(), width = width);
    }
    Ok(())
}

fn handle_annotate(text: String, all: bool, as_json: bool) -> Result<(), Box<dyn Error>> {
    let matcher = TermMatcher::new();
    let spans: Vec<MatchSpan<'_>> = if all {
        matcher.find_terms(&text).collect()
    } else {
        matcher.find_non_overlapping(&text)
    };

    if as_json {
        let payload = json!({
            "text": text,
            "overlaps": all,
            "spans": spans.iter().map(span_to_json).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if !all {
        render_markdown_block("Texto", &highlight_markdown(&matcher.segments(&text)));
    }

    if spans.is_empty() {
        println!("\nNenhum termo jurídico encontrado.");
        return Ok(());
    }
    println!("\nTermos:");
    for span in &spans {
        let via = match span.kind {
            MatchKind::Term => String::new(),
            MatchKind::Alias => format!(" (sinónimo de {})", span.entry.term()),
        };
        println!(
            "- [{}..{}] {}{}: {}",
            span.start,
            span.end,
            span.matched_text,
            via,
            span.entry.definition()
        );
    }
    Ok(())
}

#[cfg(feature = "web")]
fn handle_serve(
    addr: std::net::SocketAddr,
    base_url: Option<String>,
) -> Result<(), Box<dyn Error>> {
    use legalgloss_rs::web::{WebConfig, serve};

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "legalgloss_rs=info,tower_http=info".into()),
        )
        .init();

    let config = WebConfig {
        addr,
        base_url: base_url.unwrap_or_else(|| format!("http://{addr}")),
    };
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(config))?;
    Ok(())
}

/// Markdown with resolved terms in bold; everything else is escaped so the
/// user's own `*`, `_` or backticks render literally.
fn highlight_markdown(segments: &[Segment<'_>]) -> String {
    let mut markdown = String::new();
    for segment in segments {
        match segment {
            Segment::Plain(plain) => push_escaped(&mut markdown, plain),
            Segment::Term(span) => {
                markdown.push_str("**");
                push_escaped(&mut markdown, span.matched_text);
                markdown.push_str("**");
            }
        }
    }
    markdown
}

fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        if matches!(ch, '\\' | '*' | '_' | '`' | '~' | '#' | '|' | '[' | ']' | '>' | '-') {
            out.push('\\');
        }
        out.push(ch);
    }
}

fn span_to_json(span: &MatchSpan<'_>) -> serde_json::Value {
    json!({
        "start": span.start,
        "end": span.end,
        "text": span.matched_text,
        "key": span.key,
        "kind": match span.kind {
            MatchKind::Term => "term",
            MatchKind::Alias => "alias",
        },
        "entry_id": span.entry.id(),
        "term": span.entry.term(),
    })
}

fn entry_to_json(entry: &GlossaryEntry<'_>) -> serde_json::Value {
    json!({
        "entry_id": entry.id(),
        "term": entry.term(),
        "definition": entry.definition(),
        "category": entry.category().slug(),
        "category_label": entry.category().label(),
        "examples": entry.examples().collect::<Vec<_>>(),
        "related_terms": entry.related_terms().collect::<Vec<_>>(),
    })
}

fn print_lookup_table(rows: &[(String, Option<GlossaryEntry<'static>>)]) {
    if rows.is_empty() {
        println!("Nenhum termo indicado.");
        return;
    }
    let width = rows
        .iter()
        .map(|(term, _)| term.chars().count())
        .max()
        .unwrap_or(5)
        .max("CONSULTA".len());
    println!("{:<width$}  {}", "CONSULTA", "ENTRADA", width = width);
    println!("{:-<width$}  {}", "", "-------", width = width);
    for (term, entry) in rows {
        let value = entry
            .map(|e| format!("#{} {}", e.id(), e.term()))
            .unwrap_or_else(|| "<ausente>".to_string());
        println!("{:<width$}  {}", term, value, width = width);
    }
}

fn print_entry(entry: &GlossaryEntry<'_>) {
    println!("Termo: {} (#{})", entry.term(), entry.id());
    println!("Categoria: {}", entry.category().label());
    println!("\n{}", entry.definition());

    let examples: Vec<_> = entry.examples().collect();
    if !examples.is_empty() {
        println!("\nExemplos:");
        for example in examples {
            println!("  • {example}");
        }
    }
    let related: Vec<_> = entry.related_terms().collect();
    if !related.is_empty() {
        println!("\nTermos relacionados: {}", related.join(", "));
    }
}

fn stdout_is_tty() -> bool {
    atty::is(Stream::Stdout)
}

fn markdown_width() -> usize {
    let (width, _) = terminal_size();
    width.max(60) as usize
}

fn render_markdown_block(title: &str, body: &str) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return;
    }
    println!("{title}:");
    if stdout_is_tty() {
        let skin = MadSkin::default();
        let formatted = FmtText::from(&skin, trimmed, Some(markdown_width()));
        println!("{formatted}");
    } else {
        println!("{trimmed}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_metacharacters_in_the_text_are_escaped() {
        let segments = TermMatcher::new().segments("a*b dolo_x `c`");
        assert_eq!(
            highlight_markdown(&segments),
            "a\\*b **dolo**\\_x \\`c\\`"
        );
    }

    #[test]
    fn plain_text_without_terms_is_only_escaped() {
        let segments = TermMatcher::new().segments("# 1-2 [ok]");
        assert_eq!(highlight_markdown(&segments), "\\# 1\\-2 \\[ok\\]");
    }

    #[test]
    fn annotating_empty_text_succeeds() {
        assert!(handle_annotate(String::new(), false, false).is_ok());
        assert!(handle_annotate(String::new(), true, true).is_ok());
        assert!(handle_annotate("   ".to_string(), false, false).is_ok());
    }

    #[test]
    fn not_found_message_suggests_entry_terms() {
        let message = not_found_message("posee");
        assert!(message.starts_with("Nenhuma entrada para o termo \"posee\""));
        assert!(message.contains("usucapião"));
        assert!(!message.contains("posse,") && !message.ends_with("posse?"));
    }
}
