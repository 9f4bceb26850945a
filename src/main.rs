//! Command-line front end for the note map engine.
//!
//! Runs one analysis pass over a directory of markdown notes and prints the
//! projection summary plus the ranked connection suggestions. The
//! interactive canvas lives in a host plugin; this binary exists for
//! headless runs against the same analysis service.

use notemap::models::AnalysisSettings;
use notemap::service::{HttpAnalysisService, DEFAULT_SERVICE_URL};
use notemap::vault::FsNoteRepository;
use notemap::{Session, StdoutNotifier};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let notes_dir = std::env::args().nth(1).unwrap_or_else(|| "notes".to_string());
    let service_url =
        std::env::var("NOTEMAP_SERVICE_URL").unwrap_or_else(|_| DEFAULT_SERVICE_URL.to_string());

    let service = match HttpAnalysisService::new(&service_url) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    println!("Note map analysis");
    println!("Notes directory: {}", notes_dir);
    println!("Analysis service: {}", service.base_url());

    let repo = FsNoteRepository::new(&notes_dir);
    let mut session = Session::new(service, AnalysisSettings::default());
    let notifier = StdoutNotifier;

    let result = match session.run_analysis(&repo, &notifier).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    println!();
    println!("Clusters:");
    for cluster in 0..result.clusters {
        let members = result.points.iter().filter(|p| p.cluster == cluster).count();
        let terms = result.cluster_label_terms(cluster);
        if terms.is_empty() {
            println!("  {}: {} notes", cluster, members);
        } else {
            println!("  {}: {} notes ({})", cluster, members, terms);
        }
    }
    let noise = result.points.iter().filter(|p| p.cluster == -1).count();
    if noise > 0 {
        println!("  unclustered: {} notes", noise);
    }

    let connections = session.suggest_connections();
    println!();
    if connections.is_empty() {
        println!("No connection suggestions.");
        return;
    }

    println!("Suggested connections:");
    for (i, c) in connections.iter().enumerate() {
        println!(
            "  {}. {} <-> {} ({:.0}% similar)",
            i + 1,
            c.source_note.title,
            c.target_note.title,
            c.similarity
        );
        println!("     {}", c.reason);
        if !c.common_terms.is_empty() {
            println!("     shared terms: {}", c.common_terms.join(", "));
        }
    }
}
