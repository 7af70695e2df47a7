use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

use claimstream::{
    io, session::is_sponsor_content, AnthropicClient, AnthropicConfig, AnthropicExtractor,
    AnthropicVerifier, ClaimStore, LiveExtractor, MatchScorer, MemoryStore, OpenAlexClient,
    SerperClient, Verdict, Verifier, VerifyConfig,
};

#[derive(Parser)]
#[command(name = "claimstream")]
#[command(author, version, about = "Live claim extraction and literature verification for video transcripts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a transcript file through a live extraction session
    Extract {
        /// Input transcript file (plain text)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for accepted claims (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Session id (defaults to a random id)
        #[arg(long)]
        session_id: Option<String>,

        /// Words per simulated transcript chunk
        #[arg(long, default_value_t = io::DEFAULT_CHUNK_WORDS)]
        chunk_words: usize,

        /// Also verify each accepted claim against the literature
        #[arg(long)]
        verify: bool,

        /// Output file for verification results (JSON, requires --verify)
        #[arg(long)]
        verified_output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Verify previously extracted claims
    Verify {
        /// Input claims file (JSON, as written by extract)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for verification results (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Inspect a transcript without calling any model
    Analyze {
        /// Input transcript file (plain text)
        #[arg(short, long)]
        input: PathBuf,

        /// Words per simulated transcript chunk
        #[arg(long, default_value_t = io::DEFAULT_CHUNK_WORDS)]
        chunk_words: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            input,
            output,
            session_id,
            chunk_words,
            verify,
            verified_output,
            verbose,
        } => {
            setup_logging(verbose);
            extract_transcript(
                input,
                output,
                session_id,
                chunk_words,
                verify,
                verified_output,
            )
            .await
        }
        Commands::Verify {
            input,
            output,
            verbose,
        } => {
            setup_logging(verbose);
            verify_claims(input, output).await
        }
        Commands::Analyze { input, chunk_words } => {
            setup_logging(false);
            analyze_transcript(input, chunk_words)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn extract_transcript(
    input: PathBuf,
    output: PathBuf,
    session_id: Option<String>,
    chunk_words: usize,
    verify: bool,
    verified_output: Option<PathBuf>,
) -> Result<()> {
    info!("Loading transcript from {:?}", input);
    let transcript = io::load_transcript(&input)?;
    let chunks = io::chunk_transcript(&transcript, chunk_words);
    info!("Replaying {} chunks of ~{} words", chunks.len(), chunk_words);

    let api_config = AnthropicConfig::from_env()?;
    let extractor = AnthropicExtractor::new(AnthropicClient::new(api_config.clone()));
    let mut live = LiveExtractor::new(Box::new(extractor));

    let session_id =
        session_id.unwrap_or_else(|| format!("session_{}", Uuid::new_v4().simple()));
    live.start_session(&session_id);

    let store = MemoryStore::new();
    for chunk in &chunks {
        let accepted = live.process_chunk(chunk).await?;
        for claim in &accepted {
            println!(
                "[{}-{}] {} ({})",
                claim.start_timestamp,
                claim.end_timestamp,
                claim.finding_summary,
                claim.author_normalized.as_deref().unwrap_or("no author")
            );
            store.upsert(claim).await?;
        }
    }

    let stats = live.session_stats();
    info!(
        "Session complete: {} windows, {} claims, {} duplicates skipped, {} sponsor chunks, {} extraction failures",
        stats.windows_processed,
        stats.claims_accepted,
        stats.duplicates_skipped,
        stats.sponsor_chunks_skipped,
        stats.extraction_failures
    );

    let claims = store.all().await;
    io::write_claims(&output, &claims)?;
    info!("Claims written to {:?}", output);

    if verify {
        let verifier = build_verifier(&api_config)?;
        let verified = verifier.verify_all(&claims).await;
        print_verdict_summary(&verified);
        let path = verified_output.unwrap_or_else(|| output.with_extension("verified.json"));
        io::write_verified(&path, &verified)?;
        info!("Verification results written to {:?}", path);
    }

    Ok(())
}

async fn verify_claims(input: PathBuf, output: PathBuf) -> Result<()> {
    info!("Loading claims from {:?}", input);
    let claims = io::read_claims(&input)?;
    info!("Verifying {} claims", claims.len());

    let api_config = AnthropicConfig::from_env()?;
    let verifier = build_verifier(&api_config)?;
    let verified = verifier.verify_all(&claims).await;
    print_verdict_summary(&verified);

    io::write_verified(&output, &verified)?;
    info!("Verification results written to {:?}", output);
    Ok(())
}

fn build_verifier(api_config: &AnthropicConfig) -> Result<Verifier> {
    let mut searchers: Vec<Box<dyn claimstream::DocumentSearcher>> =
        vec![Box::new(OpenAlexClient::default())];
    match SerperClient::from_env() {
        Ok(serper) => searchers.push(Box::new(serper)),
        Err(_) => info!("SERPER_API_KEY not set, web-search fallback disabled"),
    }

    let verifier = AnthropicVerifier::new(AnthropicClient::new(api_config.clone()));
    Ok(Verifier::new(
        searchers,
        Box::new(verifier),
        MatchScorer::default(),
        VerifyConfig::default(),
    ))
}

fn print_verdict_summary(verified: &[claimstream::VerifiedClaim]) {
    let mut supported = 0;
    let mut partial = 0;
    let mut contradicted = 0;
    let mut unverifiable = 0;
    let mut no_paper = 0;
    for v in verified {
        match v.result.verdict {
            Verdict::Supported => supported += 1,
            Verdict::PartiallySupported => partial += 1,
            Verdict::Contradicted => contradicted += 1,
            Verdict::Unverifiable => unverifiable += 1,
            Verdict::NoPaperFound => no_paper += 1,
        }
    }

    println!();
    println!("Verification Summary");
    println!("--------------------");
    println!("Supported: {supported}");
    println!("Partially supported: {partial}");
    println!("Contradicted: {contradicted}");
    println!("Unverifiable: {unverifiable}");
    println!("No paper found: {no_paper}");
}

fn analyze_transcript(input: PathBuf, chunk_words: usize) -> Result<()> {
    let transcript = io::load_transcript(&input)?;
    let chunks = io::chunk_transcript(&transcript, chunk_words);
    let sponsor_chunks = chunks.iter().filter(|c| is_sponsor_content(c)).count();
    let word_count = transcript.split_whitespace().count();
    let approx_secs = chunks.len() as u64 * 10;

    println!("Transcript Analysis");
    println!("===================");
    println!("Words: {word_count}");
    println!("Chunks (~10s each): {}", chunks.len());
    println!(
        "Approximate duration: {}:{:02}",
        approx_secs / 60,
        approx_secs % 60
    );
    println!("Sponsor/ad chunks (would be skipped): {sponsor_chunks}");

    let context = chunks
        .first()
        .map(|c| c.chars().take(80).collect::<String>())
        .unwrap_or_default();
    if !context.is_empty() {
        println!("First chunk: {context}...");
    }

    Ok(())
}
