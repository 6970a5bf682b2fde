use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::time::Duration;
use unzip_bench_testserver::{TestServerConfig, TestServerStats};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let mut bind_addr: SocketAddr = "127.0.0.1:0".parse()?;
    let mut config = TestServerConfig::default();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--bind" => {
                let addr = args.next().ok_or_else(|| {
                    anyhow::anyhow!("--bind requires an address, e.g. 127.0.0.1:0")
                })?;
                bind_addr = addr.parse()?;
            }
            "--unzip-status" => {
                let status = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--unzip-status requires a status code"))?;
                config.unzip_status = Some(status.parse()?);
            }
            "--unzip-delay-ms" => {
                let ms = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--unzip-delay-ms requires milliseconds"))?;
                config.unzip_delay = Some(Duration::from_millis(ms.parse()?));
            }
            "-h" | "--help" => {
                eprintln!(
                    "unzip-bench-testserver\n\nUSAGE:\n  unzip-bench-testserver [--bind 127.0.0.1:0] [--unzip-status CODE] [--unzip-delay-ms MS]\n\nOUTPUT:\n  Prints HTTP_URL=<url> to stdout once ready."
                );
                return Ok(());
            }
            other => {
                return Err(anyhow::anyhow!("unknown argument: {other}"));
            }
        }
    }

    let listener = TcpListener::bind(bind_addr).await?;
    let addr = listener.local_addr()?;

    let app = unzip_bench_testserver::router(TestServerStats::default(), config);

    println!("HTTP_URL=http://{addr}");

    let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = tokio::signal::ctrl_c().await;
    });

    serve.await?;
    Ok(())
}
