use crate::matcher::{resolve_overlaps, segments_from};
use crate::{
    Category, Glossary, GlossaryEntry, MatchKind, MatchSpan, SearchConfig, Segment, TermMatcher,
};
use askama::Template;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{debug, info};

type SharedState = Arc<AppState>;
const MAX_ANNOTATE_BYTES: usize = 64 * 1024;
const SUGGESTION_LIMIT: usize = 3;

#[derive(Clone)]
pub struct AppState {
    pub search: SearchConfig,
    pub base_url: String,
}

#[derive(Clone)]
pub struct WebConfig {
    pub addr: SocketAddr,
    pub base_url: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            base_url: "http://127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum WebError {
    Io(std::io::Error),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for WebError {}

impl From<std::io::Error> for WebError {
    fn from(value: std::io::Error) -> Self {
        WebError::Io(value)
    }
}

pub async fn serve(config: WebConfig) -> Result<(), WebError> {
    let state = Arc::new(AppState {
        search: SearchConfig::default(),
        base_url: config.base_url.clone(),
    });
    let router = build_router(state);
    info!(
        %config.addr,
        base = %config.base_url,
        entries = Glossary::len(),
        "Binding HTTP listener"
    );
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server exited");
    Ok(())
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
    suggestions: Vec<String>,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            suggestions: Vec::new(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
            suggestions: Vec::new(),
        }
    }

    fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = if self.suggestions.is_empty() {
            json!({ "error": self.message })
        } else {
            json!({ "error": self.message, "suggestions": self.suggestions })
        };
        (self.status, Json(payload)).into_response()
    }
}

fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(glossary_html))
        .route("/glossary", get(glossary_html))
        .route("/api/term", get(api_term))
        .route("/api/terms", get(api_terms))
        .route("/api/annotate", post(api_annotate))
        .route("/healthz", get(health))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CompressionLayer::new())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "legalgloss-web" }))
}

async fn api_term(
    State(state): State<SharedState>,
    Query(params): Query<TermParams>,
) -> Result<Json<EntryPayload>, ApiError> {
    let entry = entry_from_params(&params, &state.search)?;
    Ok(Json(EntryPayload::from_entry(&entry, &state.base_url)))
}

async fn api_terms(
    State(state): State<SharedState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<TermListPayload>, ApiError> {
    let (query, category) = parse_filter_params(&params)?;
    let results: Vec<EntryPayload> = Glossary::filter(&query, category)
        .iter()
        .map(|entry| EntryPayload::from_entry(entry, &state.base_url))
        .collect();
    Ok(Json(TermListPayload {
        query,
        category: category.map(|c| c.slug().to_string()),
        total: results.len(),
        results,
    }))
}

async fn api_annotate(
    Json(request): Json<AnnotateRequest>,
) -> Result<Json<AnnotateResponse>, ApiError> {
    if request.text.len() > MAX_ANNOTATE_BYTES {
        return Err(ApiError::bad_request(format!(
            "Text exceeds {MAX_ANNOTATE_BYTES} bytes"
        )));
    }
    let raw: Vec<MatchSpan<'_>> = TermMatcher::new().find_terms(&request.text).collect();
    // One scan feeds both the reported spans and the segments.
    let (spans, resolved) = if request.overlaps {
        let resolved = resolve_overlaps(raw.clone());
        (raw, resolved)
    } else {
        let resolved = resolve_overlaps(raw);
        (resolved.clone(), resolved)
    };
    let segments = segments_from(&request.text, &resolved)
        .iter()
        .map(SegmentPayload::from_segment)
        .collect();
    debug!(
        bytes = request.text.len(),
        spans = spans.len(),
        overlaps = request.overlaps,
        "Annotated text"
    );
    let spans = spans.iter().map(SpanPayload::from_span).collect();
    Ok(Json(AnnotateResponse {
        overlaps: request.overlaps,
        spans,
        segments,
    }))
}

async fn glossary_html(
    State(state): State<SharedState>,
    Query(params): Query<FilterParams>,
) -> Response {
    let (query, category) = match parse_filter_params(&params) {
        Ok(parsed) => parsed,
        Err(err) => {
            return (err.status, Html(render_error_page(&err.message))).into_response();
        }
    };
    let entries: Vec<EntryCard> = Glossary::filter(&query, category)
        .iter()
        .map(EntryCard::from_entry)
        .collect();
    let template = GlossaryTemplate {
        canonical_url: format!("{}/glossary", state.base_url),
        query: &query,
        chips: category_chips(category, &query),
        total: Glossary::len(),
        entries,
    };
    Html(
        template
            .render()
            .unwrap_or_else(|err| render_error_page(&err.to_string())),
    )
    .into_response()
}

#[derive(Debug, Deserialize)]
struct TermParams {
    term: Option<String>,
    id: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct FilterParams {
    q: Option<String>,
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnnotateRequest {
    text: String,
    #[serde(default)]
    overlaps: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryPayload {
    entry_id: u32,
    term: String,
    definition: String,
    category: String,
    category_label: String,
    examples: Vec<String>,
    related_terms: Vec<String>,
    url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TermListPayload {
    query: String,
    category: Option<String>,
    total: usize,
    results: Vec<EntryPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SpanPayload {
    start: usize,
    end: usize,
    text: String,
    key: String,
    kind: String,
    entry_id: u32,
    term: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SegmentPayload {
    text: String,
    entry_id: Option<u32>,
    term: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AnnotateResponse {
    overlaps: bool,
    spans: Vec<SpanPayload>,
    segments: Vec<SegmentPayload>,
}

impl EntryPayload {
    fn from_entry(entry: &GlossaryEntry<'_>, base_url: &str) -> Self {
        Self {
            entry_id: entry.id(),
            term: entry.term().to_string(),
            definition: entry.definition().to_string(),
            category: entry.category().slug().to_string(),
            category_label: entry.category().label().to_string(),
            examples: collect_iter(entry.examples()),
            related_terms: collect_iter(entry.related_terms()),
            url: absolute_term_url(base_url, entry.term()),
        }
    }
}

impl SpanPayload {
    fn from_span(span: &MatchSpan<'_>) -> Self {
        Self {
            start: span.start,
            end: span.end,
            text: span.matched_text.to_string(),
            key: span.key.to_string(),
            kind: match span.kind {
                MatchKind::Term => "term",
                MatchKind::Alias => "alias",
            }
            .to_string(),
            entry_id: span.entry.id(),
            term: span.entry.term().to_string(),
        }
    }
}

impl SegmentPayload {
    fn from_segment(segment: &Segment<'_>) -> Self {
        match segment {
            Segment::Plain(text) => Self {
                text: text.to_string(),
                entry_id: None,
                term: None,
            },
            Segment::Term(span) => Self {
                text: span.matched_text.to_string(),
                entry_id: Some(span.entry.id()),
                term: Some(span.entry.term().to_string()),
            },
        }
    }
}

fn collect_iter<'a, I>(iter: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    iter.into_iter().map(|s| s.to_string()).collect()
}

fn entry_from_params(
    params: &TermParams,
    search: &SearchConfig,
) -> Result<GlossaryEntry<'static>, ApiError> {
    if let Some(id) = params.id {
        return Glossary::entry_by_id(id)
            .ok_or_else(|| ApiError::not_found(format!("No entry found for id #{id}")));
    }
    let term = params
        .term
        .as_ref()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request("Provide either `term` or `id` query parameters."))?;
    Glossary::get(term).ok_or_else(|| {
        let suggestions = Glossary::suggest_terms(term, search, SUGGESTION_LIMIT)
            .into_iter()
            .map(str::to_string)
            .collect();
        ApiError::not_found(format!("No entry found for term {term:?}"))
            .with_suggestions(suggestions)
    })
}

fn parse_filter_params(params: &FilterParams) -> Result<(String, Option<Category>), ApiError> {
    let query = params.q.as_deref().unwrap_or_default().trim().to_string();
    let category = match params
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty() && *c != "all")
    {
        Some(slug) => Some(
            slug.parse::<Category>()
                .map_err(|err| ApiError::bad_request(err.to_string()))?,
        ),
        None => None,
    };
    Ok((query, category))
}

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

fn term_anchor(term: &str) -> String {
    let words: Vec<&str> = term.split_whitespace().collect();
    format!("term-{}", words.join("-"))
}

fn absolute_term_url(base_url: &str, term: &str) -> String {
    format!(
        "{base_url}/glossary?q={}#{}",
        encode_component(term),
        encode_component(&term_anchor(term))
    )
}

fn glossary_href(category: Option<Category>, query: &str) -> String {
    let mut href = String::from("/glossary");
    let mut separator = '?';
    if let Some(category) = category {
        href.push(separator);
        href.push_str("category=");
        href.push_str(category.slug());
        separator = '&';
    }
    if !query.is_empty() {
        href.push(separator);
        href.push_str("q=");
        href.push_str(&encode_component(query));
    }
    href
}

fn badge_class(category: Category) -> &'static str {
    match category {
        Category::Civil => "bg-blue-100 text-blue-800",
        Category::Penal => "bg-red-100 text-red-800",
        Category::Trabalho => "bg-green-100 text-green-800",
        Category::Comercial => "bg-purple-100 text-purple-800",
        Category::Constitucional => "bg-yellow-100 text-yellow-800",
        Category::Processual => "bg-indigo-100 text-indigo-800",
        Category::Familiar => "bg-pink-100 text-pink-800",
    }
}

const IDLE_CHIP_CLASS: &str = "bg-gray-50 text-gray-700 border-gray-200 hover:bg-gray-100";

fn category_chips(active: Option<Category>, query: &str) -> Vec<CategoryChip> {
    let mut chips = vec![CategoryChip {
        label: "Todas",
        href: glossary_href(None, query),
        class: if active.is_none() {
            badge_class(Category::Civil)
        } else {
            IDLE_CHIP_CLASS
        },
    }];
    chips.extend(Category::ALL.into_iter().map(|category| CategoryChip {
        label: category.label(),
        href: glossary_href(Some(category), query),
        class: if active == Some(category) {
            badge_class(category)
        } else {
            IDLE_CHIP_CLASS
        },
    }));
    chips
}

fn render_error_page(message: &str) -> String {
    let message = html_escape(message);
    format!(
        r#"<!DOCTYPE html>
<html lang="pt">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Glossário Jurídico • Erro</title>
    <script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4"></script>
  </head>
  <body class="bg-slate-50 text-slate-900">
    <main class="min-h-screen flex flex-col items-center justify-start py-10 px-4">
      <div class="max-w-3xl w-full space-y-4">
        <h1 class="text-3xl font-bold">Algo correu mal</h1>
        <p class="text-lg text-slate-600">{message}</p>
        <a href="/glossary" class="text-blue-700 hover:underline">Voltar ao glossário</a>
      </div>
    </main>
  </body>
</html>"#
    )
}

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

struct CategoryChip {
    label: &'static str,
    href: String,
    class: &'static str,
}

struct EntryCard {
    anchor: String,
    term: &'static str,
    definition: &'static str,
    category_label: &'static str,
    badge_class: &'static str,
    examples: Vec<&'static str>,
    related_terms: Vec<&'static str>,
}

impl EntryCard {
    fn from_entry(entry: &GlossaryEntry<'static>) -> Self {
        Self {
            anchor: term_anchor(entry.term()),
            term: entry.term(),
            definition: entry.definition(),
            category_label: entry.category().label(),
            badge_class: badge_class(entry.category()),
            examples: entry.examples().collect(),
            related_terms: entry.related_terms().collect(),
        }
    }
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="pt">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Glossário Jurídico</title>
    <script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4"></script>
    <link rel="canonical" href="{{ canonical_url }}">
  </head>
  <body class="bg-slate-50 text-slate-900">
    <main class="min-h-screen flex flex-col items-center justify-start py-10 px-4">
      <div class="max-w-3xl w-full space-y-6">
        <div>
          <h1 class="text-3xl font-bold">Glossário Jurídico</h1>
          <p class="text-sm text-gray-600 mt-1">Explicações de termos legais moçambicanos</p>
        </div>

        <form method="get" action="/glossary" class="space-y-2">
          <label for="search" class="block text-sm font-medium text-gray-700">Buscar termo</label>
          <input id="search" name="q" type="text" value="{{ query }}" placeholder="Digite um termo jurídico..."
                 class="w-full px-3 py-2 border border-gray-300 rounded-md" />
        </form>

        <div class="flex flex-wrap gap-2">
          {% for chip in chips %}
          <a href="{{ chip.href }}" class="px-3 py-1 text-sm rounded-full border {{ chip.class }}">{{ chip.label }}</a>
          {% endfor %}
        </div>

        <p class="text-sm text-gray-500">{{ entries.len() }} de {{ total }} termos</p>

        {% if entries.len() == 0 %}
        <div class="text-center py-8">
          <p class="text-gray-500">Nenhum termo encontrado.</p>
        </div>
        {% else %}
        <div class="space-y-4">
          {% for entry in entries %}
          <article id="{{ entry.anchor }}" class="bg-white shadow rounded p-4 space-y-3">
            <div class="flex items-center justify-between">
              <h2 class="font-semibold text-gray-900 capitalize">{{ entry.term }}</h2>
              <span class="px-2 py-1 text-xs font-medium rounded-full {{ entry.badge_class }}">{{ entry.category_label }}</span>
            </div>
            <p class="text-sm text-gray-700 leading-relaxed">{{ entry.definition }}</p>
            {% if entry.examples.len() > 0 %}
            <div class="space-y-1">
              <h3 class="text-xs font-medium text-gray-600 uppercase tracking-wider">Exemplos:</h3>
              <ul class="text-xs text-gray-600 space-y-1">
                {% for example in entry.examples %}
                <li>• {{ example }}</li>
                {% endfor %}
              </ul>
            </div>
            {% endif %}
            {% if entry.related_terms.len() > 0 %}
            <div class="space-y-1">
              <h3 class="text-xs font-medium text-gray-600 uppercase tracking-wider">Termos relacionados:</h3>
              <div class="flex flex-wrap gap-1">
                {% for related in entry.related_terms %}
                <span class="px-2 py-1 text-xs bg-gray-100 text-gray-700 rounded-md">{{ related }}</span>
                {% endfor %}
              </div>
            </div>
            {% endif %}
          </article>
          {% endfor %}
        </div>
        {% endif %}
      </div>
    </main>
  </body>
</html>"#,
    ext = "html"
)]
struct GlossaryTemplate<'a> {
    canonical_url: String,
    query: &'a str,
    chips: Vec<CategoryChip>,
    total: usize,
    entries: Vec<EntryCard>,
}

#[cfg(all(test, feature = "web"))]
mod tests {
    use super::*;
    use axum::{body, body::Body, http::Request};
    use tower::ServiceExt;

    fn test_router() -> Router {
        let state = Arc::new(AppState {
            search: SearchConfig::default(),
            base_url: "http://127.0.0.1:8080".to_string(),
        });
        build_router(state)
    }

    async fn get_response(uri: &str) -> Response {
        test_router()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_bytes(response: Response) -> body::Bytes {
        body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = get_response("/healthz").await;
        assert!(response.status().is_success());
        let payload: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(payload["status"], "ok");
    }

    #[tokio::test]
    async fn api_term_usucapiao() {
        let response = get_response("/api/term?term=Usucapi%C3%A3o").await;
        assert!(response.status().is_success());
        let payload: EntryPayload = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(payload.term, "usucapião");
        assert_eq!(payload.category, "civil");
        assert_eq!(payload.category_label, "Direito Civil");
        assert!(payload.related_terms.contains(&"posse".to_string()));
    }

    #[tokio::test]
    async fn api_term_resolves_alias() {
        let response = get_response("/api/term?term=posse").await;
        assert!(response.status().is_success());
        let payload: EntryPayload = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(payload.term, "usucapião");
    }

    #[tokio::test]
    async fn api_term_miss_offers_suggestions() {
        let response = get_response("/api/term?term=usucapiao").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let payload: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        let suggestions = payload["suggestions"].as_array().expect("suggestions present");
        assert_eq!(suggestions[0], "usucapião");
    }

    #[tokio::test]
    async fn api_term_requires_a_parameter() {
        let response = get_response("/api/term").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn api_terms_filters_by_category() {
        let response = get_response("/api/terms?category=penal").await;
        assert!(response.status().is_success());
        let payload: TermListPayload = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(payload.total, Glossary::by_category(Category::Penal).count());
        assert!(payload.results.iter().all(|entry| entry.category == "penal"));
    }

    #[tokio::test]
    async fn api_terms_rejects_unknown_category() {
        let response = get_response("/api/terms?category=administrativo").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn api_annotate_reports_term_and_alias() {
        let text = "A usucapião exige posse pacífica.";
        let request = Request::post("/api/annotate")
            .header("content-type", "application/json")
            .body(Body::from(json!({ "text": text }).to_string()))
            .unwrap();
        let response = test_router().oneshot(request).await.unwrap();
        assert!(response.status().is_success());
        let payload: AnnotateResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
        let keys: Vec<_> = payload.spans.iter().map(|span| span.key.as_str()).collect();
        assert_eq!(keys, vec!["usucapião", "posse"]);
        assert_eq!(payload.spans[1].kind, "alias");
        let rebuilt: String = payload.segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(rebuilt, text);
    }

    #[tokio::test]
    async fn api_annotate_can_keep_overlaps() {
        let request = Request::post("/api/annotate")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "text": "legítima defesa", "overlaps": true }).to_string(),
            ))
            .unwrap();
        let response = test_router().oneshot(request).await.unwrap();
        let payload: AnnotateResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(payload.spans.len(), 2);
        assert_eq!(payload.segments.len(), 1);
    }

    #[tokio::test]
    async fn api_annotate_handles_a_body_near_the_limit() {
        let text = "dolo ".repeat(13_000);
        let request = Request::post("/api/annotate")
            .header("content-type", "application/json")
            .body(Body::from(json!({ "text": text, "overlaps": true }).to_string()))
            .unwrap();
        let response = test_router().oneshot(request).await.unwrap();
        assert!(response.status().is_success());
        let payload: AnnotateResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(payload.spans.len(), 13_000);
        let terms = payload
            .segments
            .iter()
            .filter(|segment| segment.entry_id.is_some())
            .count();
        assert_eq!(terms, 13_000);
        let rebuilt: String = payload.segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(rebuilt, text);
    }

    #[tokio::test]
    async fn glossary_page_renders() {
        let response = get_response("/glossary?category=civil&q=posse").await;
        assert!(response.status().is_success());
        let html = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
        assert!(html.contains("Glossário Jurídico"));
        assert!(html.contains("id=\"term-usucapião\""));
        assert!(!html.contains("Nenhum termo encontrado."));
    }

    #[tokio::test]
    async fn glossary_page_rejects_unknown_category() {
        let response = get_response("/glossary?category=maritimo").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn glossary_href_encodes_query() {
        assert_eq!(glossary_href(None, ""), "/glossary");
        assert_eq!(
            glossary_href(Some(Category::Penal), "justa causa"),
            "/glossary?category=penal&q=justa%20causa"
        );
    }
}
