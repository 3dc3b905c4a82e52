use lambda_http::{run, service_fn, Error as LambdaError, Request as LambdaRequest};
use tracing::{info, warn};

use imagine_video_lambda::{Config, VideoHandler};

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .without_time() // CloudWatch will add the ingestion time
        .with_target(false)
        .init();

    let config = Config::from_env();
    if config.api_key.is_none() {
        warn!("IMAGINE_API_KEY is not set, generation requests will fail");
    }
    info!(
        "Provider {} (poll {} x {:?})",
        config.base_url,
        config.poll.max_attempts(),
        config.poll.interval()
    );

    let handler = VideoHandler::new(config)?;

    run(service_fn(|request: LambdaRequest| async {
        Result::<_, LambdaError>::Ok(handler.handle(request).await)
    }))
    .await
}
