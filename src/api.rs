//! PokeAPI client: wire types, error taxonomy and the reqwest-backed source.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::state::Category;

pub const DEFAULT_API_BASE: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_SPRITE_BASE: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork";

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("malformed payload from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{name} lists {found} stats, need at least {required}")]
    MissingStat {
        name: String,
        found: usize,
        required: usize,
    },
    #[error("detail lookup task failed: {0}")]
    Task(String),
}

#[derive(Clone, Debug, Deserialize)]
pub struct NamedResource {
    pub name: String,
}

/// Opaque pointer to a Pokémon; only good for a follow-up detail lookup.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct MemberRef {
    pub url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct TypeResponse {
    pokemon: Vec<TypeMemberSlot>,
}

#[derive(Clone, Debug, Deserialize)]
struct TypeMemberSlot {
    pokemon: MemberRef,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PokemonPayload {
    pub id: u16,
    pub name: String,
    #[serde(default)]
    pub types: Vec<TypeSlot>,
    pub stats: Vec<StatSlot>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TypeSlot {
    #[serde(rename = "type")]
    pub type_info: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StatSlot {
    pub base_stat: u16,
    #[serde(default)]
    pub stat: Option<NamedResource>,
}

/// Where roster data comes from. Production uses [`HttpSource`].
#[async_trait]
pub trait PokeSource: Send + Sync {
    /// Ordered members of a category, as returned by `/type/{category}`.
    async fn type_members(&self, category: Category) -> Result<Vec<MemberRef>, ApiError>;

    async fn pokemon(&self, member: &MemberRef) -> Result<PokemonPayload, ApiError>;
}

pub struct HttpSource {
    client: reqwest::Client,
    api_base: String,
}

impl HttpSource {
    pub fn new(api_base: &str) -> Self {
        Self::with_client(reqwest::Client::new(), api_base)
    }

    pub fn with_client(client: reqwest::Client, api_base: &str) -> Self {
        Self {
            client,
            api_base: trim_base(api_base),
        }
    }

    pub fn type_url(&self, category: Category) -> String {
        format!("{}/type/{}", self.api_base, category.slug())
    }

    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;
        Ok(bytes.to_vec())
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let bytes = self.fetch_bytes(url).await?;
        decode_json(url, &bytes)
    }
}

#[async_trait]
impl PokeSource for HttpSource {
    async fn type_members(&self, category: Category) -> Result<Vec<MemberRef>, ApiError> {
        let url = self.type_url(category);
        tracing::debug!(%url, "category lookup");
        let response: TypeResponse = self.fetch_json(&url).await?;
        Ok(members_of(response))
    }

    async fn pokemon(&self, member: &MemberRef) -> Result<PokemonPayload, ApiError> {
        self.fetch_json(&member.url).await
    }
}

fn members_of(response: TypeResponse) -> Vec<MemberRef> {
    response
        .pokemon
        .into_iter()
        .map(|slot| slot.pokemon)
        .collect()
}

pub fn decode_json<T: DeserializeOwned>(url: &str, bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}

pub fn trim_base(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}

/// Official artwork location for a Pokémon id.
pub fn artwork_url(sprite_base: &str, id: u16) -> String {
    format!("{}/{id}.png", trim_base(sprite_base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answers a single request with `status` and `body`, returning the
    /// API base URL to point a source at.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 2048];
            let _ = socket.read(&mut request).await;
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}/api/v2/")
    }

    fn local_source(api_base: &str) -> HttpSource {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        HttpSource::with_client(client, api_base)
    }

    #[test]
    fn type_response_keeps_member_order() {
        let body = br#"{
            "damage_relations": {},
            "pokemon": [
                {"pokemon": {"name": "charmander", "url": "https://pokeapi.co/api/v2/pokemon/4/"}, "slot": 1},
                {"pokemon": {"name": "vulpix", "url": "https://pokeapi.co/api/v2/pokemon/37/"}, "slot": 1}
            ]
        }"#;
        let response: TypeResponse = decode_json("type/fire", body).unwrap();
        let urls: Vec<_> = members_of(response).into_iter().map(|m| m.url).collect();
        assert_eq!(
            urls,
            vec![
                "https://pokeapi.co/api/v2/pokemon/4/".to_string(),
                "https://pokeapi.co/api/v2/pokemon/37/".to_string(),
            ]
        );
    }

    #[test]
    fn pokemon_payload_parses_named_and_bare_stats() {
        let body = br#"{
            "id": 7,
            "name": "squirtle",
            "types": [{"slot": 1, "type": {"name": "water", "url": "x"}}],
            "stats": [
                {"base_stat": 44, "stat": {"name": "hp"}},
                {"base_stat": 48},
                {"base_stat": 65}
            ]
        }"#;
        let payload: PokemonPayload = decode_json("pokemon/7", body).unwrap();
        assert_eq!(payload.id, 7);
        assert_eq!(payload.types[0].type_info.name, "water");
        assert_eq!(payload.stats.len(), 3);
        assert_eq!(payload.stats[0].stat.as_ref().map(|s| s.name.as_str()), Some("hp"));
        assert!(payload.stats[1].stat.is_none());
    }

    #[test]
    fn malformed_payload_is_a_decode_error() {
        let err = decode_json::<PokemonPayload>("pokemon/1", b"{\"id\": \"one\"}").unwrap_err();
        assert!(matches!(err, ApiError::Decode { ref url, .. } if url == "pokemon/1"));
        assert!(err.to_string().starts_with("malformed payload from pokemon/1"));
    }

    #[test]
    fn urls_trim_trailing_slashes() {
        let source = HttpSource::new("http://localhost:9000/api/v2/");
        assert_eq!(
            source.type_url(Category::Water),
            "http://localhost:9000/api/v2/type/water"
        );
        assert_eq!(artwork_url("http://img/", 25), "http://img/25.png");
        assert_eq!(
            artwork_url(DEFAULT_SPRITE_BASE, 1),
            format!("{DEFAULT_SPRITE_BASE}/1.png")
        );
    }

    #[tokio::test]
    async fn server_error_is_a_status_error() {
        let base = serve_once("500 Internal Server Error", "").await;
        let source = local_source(&base);
        let err = source.type_members(Category::Water).await.unwrap_err();
        assert!(
            matches!(err, ApiError::Status { status: 500, ref url } if url.ends_with("/api/v2/type/water")),
            "unexpected error: {err}"
        );
    }

    #[tokio::test]
    async fn closed_port_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = local_source(&format!("http://{addr}/api/v2"));
        let err = source.type_members(Category::Fire).await.unwrap_err();
        assert!(
            matches!(err, ApiError::Transport { ref url, .. } if url.ends_with("/type/fire")),
            "unexpected error: {err}"
        );
    }

    #[tokio::test]
    async fn category_members_come_back_over_http() {
        let base = serve_once(
            "200 OK",
            r#"{"pokemon": [{"pokemon": {"url": "http://x/pokemon/7/"}}, {"pokemon": {"url": "http://x/pokemon/8/"}}]}"#,
        )
        .await;
        let members = local_source(&base)
            .type_members(Category::Water)
            .await
            .unwrap();
        assert_eq!(
            members,
            vec![
                MemberRef {
                    url: "http://x/pokemon/7/".into()
                },
                MemberRef {
                    url: "http://x/pokemon/8/".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn server_error_fails_the_roster_fetch() {
        let base = serve_once("500 Internal Server Error", "").await;
        let pipeline = crate::roster::RosterPipeline::new(local_source(&base), "http://img", 4);
        let err = pipeline
            .fetch(Category::Water, crate::state::Quantity::Limit(50))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
        assert!(err.to_string().ends_with("/api/v2/type/water returned HTTP 500"));
    }

    #[test]
    fn status_error_message() {
        let err = ApiError::Status {
            url: "http://x/type/fire".into(),
            status: 500,
        };
        assert_eq!(err.to_string(), "http://x/type/fire returned HTTP 500");
    }
}
