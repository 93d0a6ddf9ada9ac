use std::sync::Arc;
use std::time::Duration;

use sheetgrid_lib::SheetClient;
use sheetgrid_lib::service::DataService;
use sheetgrid_lib::service::serve;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::args::ServeArgs;
use crate::args::SourceArgs;
use crate::error::CliError;

/// Builds the upstream page service from the source options.
pub fn data_service(source: &SourceArgs) -> Result<DataService, CliError> {
    let url = source.url.clone().ok_or(CliError::MissingSource)?;
    let client = SheetClient::builder()
        .url(url)
        .prefix_len(source.prefix_len)
        .suffix_len(source.suffix_len)
        .timeout(Duration::from_secs(source.timeout))
        .build()?;
    Ok(DataService::new(client).with_filter_column(&source.filter_column))
}

pub async fn run(args: ServeArgs) -> Result<(), CliError> {
    let service = data_service(&args.source)?;
    let listener = TcpListener::bind(args.addr).await?;
    println!("Serving {} on http://{}/api/data", service.client().url(), listener.local_addr()?);

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("interrupt received");
        }
        shutdown.cancel();
    });

    serve(listener, Arc::new(service), cancel).await?;
    Ok(())
}
