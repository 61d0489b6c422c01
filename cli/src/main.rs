//! puppet-provision - install, configure and run a Puppet agent on this node

use clap::Parser;

use puppet_provision::cli::Cli;
use puppet_provision::domain::ProvisionError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    puppet_provision::logging::init(cli.verbose);

    let result = tokio::select! {
        result = cli.run() => result,
        _ = tokio::signal::ctrl_c() => Err(anyhow::anyhow!("interrupted")),
    };
    if let Err(e) = result {
        let kind = e
            .downcast_ref::<ProvisionError>()
            .map_or("internal", ProvisionError::kind);
        tracing::error!(kind, "provisioning failed");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
