use clap::Parser;
use mindjungle::cli::{
    handle_delete, handle_edit, handle_export, handle_export_all, handle_init, handle_links,
    handle_list, handle_new, handle_render, handle_show, handle_stats, Cli, Commands,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("MINDJUNGLE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => handle_init(),
        Commands::New {
            kind,
            title,
            tags,
            authors,
            year,
            stdin,
            json,
        } => handle_new(kind, title, tags, authors, year, stdin, json).await,
        Commands::List { kind, search, json } => handle_list(kind, search, json).await,
        Commands::Show { reference, json } => handle_show(reference, json).await,
        Commands::Edit {
            reference,
            title,
            kind,
            status,
            tags,
            authors,
            year,
            summary,
            outline,
            content,
            references,
            stdin,
            json,
        } => {
            handle_edit(
                reference, title, kind, status, tags, authors, year, summary, outline, content,
                references, stdin, json,
            )
            .await
        }
        Commands::Delete { reference, force } => handle_delete(reference, force).await,
        Commands::Links { reference, json } => handle_links(reference, json).await,
        Commands::Render { reference } => handle_render(reference).await,
        Commands::Export {
            reference,
            format,
            output,
        } => handle_export(reference, format, output).await,
        Commands::ExportAll { dir, format } => handle_export_all(dir, format).await,
        Commands::Stats { reference, json } => handle_stats(reference, json).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
