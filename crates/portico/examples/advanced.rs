//! Advanced example: JSON login issuing a JWT, a multipart upload and an
//! admin group protected by bearer auth.
//!
//! ```text
//! cargo run -p portico --example advanced
//! TOKEN=$(curl -s -XPOST localhost:8080/login -H 'content-type: application/json' -d '{}' | jq -r .token)
//! curl -H "Authorization: Bearer $TOKEN" localhost:8080/admin/hello
//! curl -F file=@Cargo.toml localhost:8080/upload
//! ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use portico::prelude::*;
use portico::schema::Empty;
use portico::server::Interactor;
use serde::{Deserialize, Serialize};

const SIGNING_KEY: &[u8] = b"secret";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    name: String,
    admin: bool,
    exp: i64,
}

#[derive(Debug, Serialize, Deserialize, Describe)]
#[param(crate = "portico::schema")]
struct LoginInput {
    #[param(json = "username", min_length = 3, default = "admin")]
    username: String,
    #[param(json = "password", min_length = 3, default = "a12345")]
    password: String,
}

#[derive(Debug, Serialize, Deserialize, Describe)]
#[param(crate = "portico::schema")]
struct LoginOutput {
    token: String,
}

#[derive(Debug, Serialize, Deserialize, Describe)]
#[param(crate = "portico::schema")]
struct UploadInput {
    #[param(formData = "file", json = "-", required)]
    file: FormFile,
}

#[derive(Debug, Serialize, Deserialize, Describe)]
#[param(crate = "portico::schema")]
struct UploadOutput {
    filename: String,
    size: usize,
}

fn login() -> impl Interactor {
    Handler::new(|_ctx: Context, input: LoginInput| async move {
        if input.username != "admin" || input.password != "a12345" {
            return Err(Error::from(HttpError::bad_request(
                "Incorrect username or password",
            )));
        }

        let claims = Claims {
            name: "Jon Snow".to_string(),
            admin: true,
            exp: (Utc::now() + Duration::hours(72)).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SIGNING_KEY))
            .map_err(Error::from_std)?;
        Ok::<_, Error>(LoginOutput { token })
    })
    .summary("Login")
    .tags(["Auth"])
}

fn hello() -> impl Interactor {
    Handler::new(|ctx: Context, _input: Empty| async move {
        let name = ctx
            .get::<Claims>()
            .map(|claims| claims.name.clone())
            .ok_or_else(|| Error::msg("claims missing from context"))?;
        Ok::<_, Error>(format!("Welcome {name}!"))
    })
    .summary("Hello")
}

fn upload() -> impl Interactor {
    Handler::new(|_ctx: Context, input: UploadInput| async move {
        Ok::<_, Error>(UploadOutput {
            filename: input.file.filename().unwrap_or_default().to_string(),
            size: input.file.len(),
        })
    })
    .tags(["Upload"])
}

fn jwt() -> BearerAuth<impl Fn(&str) -> Result<Claims, Error> + Send + Sync + 'static> {
    BearerAuth::new(|token: &str| {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(SIGNING_KEY),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            HttpError::with_message(StatusCode::UNAUTHORIZED, "invalid or expired jwt")
                .with_internal(Error::from_std(e))
                .into()
        })
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::new()
        .with_development()
        .with_dotenv()
        .with_env_prefix("PORTICO")
        .load()?;
    init_logging(&config.logging)?;

    let mut service = Service::new(config.server.base_url.clone())
        .with_server_config(ServerConfig::from(&config.server));
    service.info("Advance Example", "1.0.0");
    service.with_http_bearer_security("bearerAuth");
    service.post("/login", login());
    service.post("/upload", upload());

    service
        .group("/admin")
        .tags(["Admin"])
        .security("bearerAuth")
        .guard(jwt())
        .get("/hello", hello());

    let mut settings = Map::new();
    settings.insert("persistAuthorization".into(), json!(true));
    service.docs("/docs", settings);

    tracing::info!("docs at http://{}/docs", config.server.http_addr);
    service.run().await?;
    Ok(())
}
