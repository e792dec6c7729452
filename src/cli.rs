use crate::api::HttpApi;
use crate::app::{ActionError, App, NO_RELATIONSHIPS};
use crate::config::{Config, load_config};
use crate::date::{format_long_date, life_span};
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::model::{Event, FamilySnapshot, Gender, Person, Relationship};
use crate::notify::NotificationLevel;
use crate::render::{render_family_svg, render_timeline_svg, write_output_png, write_output_svg};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "akar",
    version,
    about = "Family tree and event timeline renderer for the Akar genealogy API"
)]
pub struct Args {
    /// Config JSON/JSON5 file (theme, themeVariables, layout, api)
    #[arg(short = 'c', long = "configFile", global = true)]
    pub config: Option<PathBuf>,

    /// API base URL, overrides the config file
    #[arg(long = "apiUrl", global = true)]
    pub api_url: Option<String>,

    /// Read people, relationships and events from a JSON snapshot ('-' for
    /// stdin) instead of the API
    #[arg(short = 'i', long = "input", global = true)]
    pub input: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the family tree
    Tree(RenderArgs),
    /// Render the event timeline
    Timeline(RenderArgs),
    /// Show family statistics
    Stats,
    /// List, show, add, edit or delete family members
    Person {
        #[command(subcommand)]
        command: PersonCommand,
    },
    /// Add, edit or delete events
    Event {
        #[command(subcommand)]
        command: EventCommand,
    },
    /// Add or delete relationships
    Relationship {
        #[command(subcommand)]
        command: RelationshipCommand,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct RenderArgs {
    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Write the computed layout as JSON
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

#[derive(Subcommand, Debug)]
pub enum PersonCommand {
    List,
    Show { id: String },
    Add(PersonFields),
    Edit {
        id: String,
        #[command(flatten)]
        fields: PersonFields,
    },
    Delete { id: String },
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct PersonFields {
    #[arg(long = "name")]
    pub full_name: Option<String>,
    #[arg(long = "nativeName")]
    pub native_name: Option<String>,
    /// male or female
    #[arg(long)]
    pub gender: Option<String>,
    /// Birth date (YYYY-MM-DD)
    #[arg(long = "birth")]
    pub birth_date: Option<String>,
    /// Death date (YYYY-MM-DD)
    #[arg(long = "death")]
    pub death_date: Option<String>,
    #[arg(long = "placeOfBirth")]
    pub place_of_birth: Option<String>,
    #[arg(long)]
    pub suku: Option<String>,
    #[arg(long)]
    pub kota: Option<String>,
    #[arg(long)]
    pub provinsi: Option<String>,
    #[arg(long)]
    pub negara: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl PersonFields {
    /// Overwrites only the fields that were given.
    pub fn apply(&self, person: &mut Person) {
        let set = |target: &mut Option<String>, value: &Option<String>| {
            if let Some(value) = value {
                *target = Some(value.clone());
            }
        };
        if let Some(name) = &self.full_name {
            person.full_name = name.clone();
        }
        if let Some(gender) = &self.gender {
            person.gender = Gender::from_token(gender);
        }
        set(&mut person.native_name, &self.native_name);
        set(&mut person.birth_date, &self.birth_date);
        set(&mut person.death_date, &self.death_date);
        set(&mut person.place_of_birth, &self.place_of_birth);
        set(&mut person.suku, &self.suku);
        set(&mut person.kota, &self.kota);
        set(&mut person.provinsi, &self.provinsi);
        set(&mut person.negara, &self.negara);
        set(&mut person.notes, &self.notes);
    }
}

#[derive(Subcommand, Debug)]
pub enum EventCommand {
    List,
    Add(EventFields),
    Edit {
        id: String,
        #[command(flatten)]
        fields: EventFields,
    },
    Delete { id: String },
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct EventFields {
    #[arg(long)]
    pub title: Option<String>,
    /// Event date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Participant person id; repeat for several
    #[arg(long = "participant")]
    pub participants: Vec<String>,
    #[arg(long = "type")]
    pub kind: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
}

impl EventFields {
    pub fn apply(&self, event: &mut Event) {
        if let Some(title) = &self.title {
            event.title = title.clone();
        }
        if self.date.is_some() {
            event.date = self.date.clone();
        }
        if self.description.is_some() {
            event.description = self.description.clone();
        }
        if !self.participants.is_empty() {
            event.participants = self.participants.clone();
        }
        if self.kind.is_some() {
            event.kind = self.kind.clone();
        }
        if self.location.is_some() {
            event.location = self.location.clone();
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum RelationshipCommand {
    Add {
        person_id_1: String,
        person_id_2: String,
        /// spouse, parent_of, child or sibling
        #[arg(long = "type")]
        kind: String,
    },
    Delete { id: String },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(url) = &args.api_url {
        config.api.base_url = url.clone();
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    runtime.block_on(execute(args, config))
}

async fn execute(args: Args, config: Config) -> Result<()> {
    let api = HttpApi::new(&config.api)?;
    let mut app = App::new(api, config);
    let offline = args.input.is_some();

    match &args.input {
        Some(path) => app.load_snapshot(read_snapshot(path)?),
        None => app.load().await,
    }
    flush_notifications(&mut app);

    if offline && is_mutation(&args.command) {
        anyhow::bail!("--input is read-only; changes need the API");
    }

    let result = match args.command {
        Command::Tree(render) => render_output(&app, View::Tree, &render),
        Command::Timeline(render) => render_output(&app, View::Timeline, &render),
        Command::Stats => {
            print_stats(&app, offline);
            Ok(())
        }
        Command::Person { command } => person_command(&mut app, command).await,
        Command::Event { command } => event_command(&mut app, command).await,
        Command::Relationship { command } => relationship_command(&mut app, command).await,
    };
    flush_notifications(&mut app);
    result
}

fn is_mutation(command: &Command) -> bool {
    match command {
        Command::Person { command } => !matches!(
            command,
            PersonCommand::List | PersonCommand::Show { .. }
        ),
        Command::Event { command } => !matches!(command, EventCommand::List),
        Command::Relationship { .. } => true,
        Command::Tree(_) | Command::Timeline(_) | Command::Stats => false,
    }
}

fn flush_notifications(app: &mut App<HttpApi>) {
    for note in app.notifications_mut().drain() {
        let tag = match note.level {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "ok",
            NotificationLevel::Error => "error",
        };
        eprintln!("[{tag}] {}", note.message);
    }
}

fn read_snapshot(path: &Path) -> Result<FamilySnapshot> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?
    };
    parse_snapshot(&content)
}

fn parse_snapshot(content: &str) -> Result<FamilySnapshot> {
    serde_json::from_str(content).context("parsing family snapshot")
}

#[derive(Debug, Clone, Copy)]
enum View {
    Tree,
    Timeline,
}

fn render_output(app: &App<HttpApi>, view: View, args: &RenderArgs) -> Result<()> {
    let config = app.config();
    let mut render_cfg = config.render.clone();
    if let Some(width) = args.width {
        render_cfg.width = width;
    }
    if let Some(height) = args.height {
        render_cfg.height = height;
    }

    let svg = match view {
        View::Tree => {
            let layout = app.tree_layout();
            if let Some(path) = &args.dump_layout {
                let dump = LayoutDump::from_family(&layout, &app.state().graph);
                write_layout_dump(path, &dump)?;
            }
            render_family_svg(&layout, &config.theme, &config.layout)
        }
        View::Timeline => {
            let layout = app.timeline_layout();
            if let Some(path) = &args.dump_layout {
                write_layout_dump(path, &LayoutDump::from_timeline(&layout))?;
            }
            render_timeline_svg(&layout, &config.theme, &config.layout)
        }
    };

    match args.output_format {
        OutputFormat::Svg => write_output_svg(&svg, args.output.as_deref()),
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_output_png(&svg, &output, &render_cfg)
        }
    }
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

fn print_stats(app: &App<HttpApi>, offline: bool) {
    let stats = if offline {
        app.state().family.statistics()
    } else {
        app.state().statistics.clone()
    };
    println!("Total anggota: {}", stats.total_people);
    println!("Total hubungan: {}", stats.total_relationships);
    println!("Total acara: {}", stats.total_events);
    println!("Jenis kelamin: {}", stats.gender_summary());
}

fn finish(result: std::result::Result<(), ActionError>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(ActionError::Invalid(errors)) => {
            for error in &errors {
                eprintln!("  {}: {}", error.field, error.message);
            }
            anyhow::bail!("{} field(s) invalid", errors.len())
        }
        Err(ActionError::Api(err)) => Err(err.into()),
    }
}

async fn person_command(app: &mut App<HttpApi>, command: PersonCommand) -> Result<()> {
    match command {
        PersonCommand::List => {
            for person in &app.state().family.people {
                println!(
                    "{}\t{}\t{}",
                    person.id,
                    person.full_name,
                    life_span(person.birth_date.as_deref(), person.death_date.as_deref())
                );
            }
            Ok(())
        }
        PersonCommand::Show { id } => show_person(app, &id),
        PersonCommand::Add(fields) => {
            let mut person = Person::default();
            fields.apply(&mut person);
            finish(app.add_person(person).await.map(|created| {
                println!("{}", created.id);
            }))
        }
        PersonCommand::Edit { id, fields } => {
            let mut person = app
                .state()
                .person(&id)
                .cloned()
                .with_context(|| format!("no member with id {id}"))?;
            fields.apply(&mut person);
            finish(app.update_person(&id, person).await)
        }
        PersonCommand::Delete { id } => finish(app.delete_person(&id).await),
    }
}

fn show_person(app: &App<HttpApi>, id: &str) -> Result<()> {
    let person = app
        .state()
        .person(id)
        .with_context(|| format!("no member with id {id}"))?;
    println!("{}", person.full_name);
    if let Some(native) = person.native_name() {
        println!("{native}");
    }
    println!("{}", person.gender.label());
    if person.birth_date.is_some() {
        println!("Lahir: {}", format_long_date(person.birth_date.as_deref()));
    }
    if person.death_date.is_some() {
        println!("Meninggal: {}", format_long_date(person.death_date.as_deref()));
    }
    for (label, value) in person.locale_attributes() {
        println!("{label}: {value}");
    }

    let relations = app.member_relationships(id);
    println!();
    if relations.is_empty() {
        println!("{NO_RELATIONSHIPS}");
    }
    for relation in relations {
        println!(
            "{}\t{}\t{}",
            relation.label, relation.other.full_name, relation.relationship_id
        );
    }
    Ok(())
}

async fn event_command(app: &mut App<HttpApi>, command: EventCommand) -> Result<()> {
    match command {
        EventCommand::List => {
            for event in &app.state().family.events {
                println!(
                    "{}\t{}\t{}",
                    event.id,
                    format_long_date(event.date.as_deref()),
                    event.title
                );
            }
            Ok(())
        }
        EventCommand::Add(fields) => {
            let mut event = Event::default();
            fields.apply(&mut event);
            finish(app.add_event(event).await.map(|created| {
                println!("{}", created.id);
            }))
        }
        EventCommand::Edit { id, fields } => {
            let mut event = app
                .state()
                .event(&id)
                .cloned()
                .with_context(|| format!("no event with id {id}"))?;
            fields.apply(&mut event);
            finish(app.update_event(&id, event).await)
        }
        EventCommand::Delete { id } => finish(app.delete_event(&id).await),
    }
}

async fn relationship_command(app: &mut App<HttpApi>, command: RelationshipCommand) -> Result<()> {
    match command {
        RelationshipCommand::Add {
            person_id_1,
            person_id_2,
            kind,
        } => {
            let relationship = Relationship::new("", person_id_1, person_id_2, kind);
            finish(app.add_relationship(relationship).await.map(|created| {
                println!("{}", created.id);
            }))
        }
        RelationshipCommand::Delete { id } => finish(app.delete_relationship(&id).await),
    }
}
