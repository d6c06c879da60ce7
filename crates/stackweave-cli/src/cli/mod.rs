//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums. No business logic lives here.

use clap::{Args, Parser, Subcommand, ValueEnum};

use stackweave_core::domain::{
    BudgetTier, BusinessRequirements, CompatibilityContext, Compliance, ConsistencyLevel,
    DomainError, Environment, ExpectedLoad, IsolationLevel, LatencyRequirement, MultiTenancy,
    ScalingFlags, ServiceIdentifier, TeamSize, TenancyStrategy, Timeline,
};

use crate::config::Defaults;

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "stackweave",
    bin_name = "stackweave",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Resolve service dependencies and check stack compatibility",
    long_about = "Stackweave expands a set of requested services (database, auth, \
                  payment, ...) into a dependency-ordered stack, checks it against \
                  compatibility rules for your deployment context, and recommends \
                  a pre-validated bundle from business requirements.",
    after_help = "EXAMPLES:\n\
        \x20 stackweave resolve payment:stripe auth:better-auth\n\
        \x20 stackweave check database:sqlite --env production --load high\n\
        \x20 stackweave recommend --users 50000 --tenants 100 --budget high --compliance soc2\n\
        \x20 stackweave completions bash > /usr/share/bash-completion/completions/stackweave",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Expand, order and evaluate a set of services.
    #[command(
        visible_alias = "r",
        about = "Resolve services into an ordered, evaluated stack",
        after_help = "EXAMPLES:\n\
            \x20 stackweave resolve payment:stripe\n\
            \x20 stackweave resolve database:postgresql+multi-tenant auth:clerk --tenancy rls\n\
            \x20 stackweave resolve database:sqlite --env production --strict"
    )]
    Resolve(ResolveArgs),

    /// Evaluate services as given, without dependency expansion.
    #[command(
        about = "Check a service set for compatibility issues",
        after_help = "EXAMPLES:\n\
            \x20 stackweave check database:sqlite payment:stripe --env production\n\
            \x20 stackweave check database:mongodb --consistency strong --strict"
    )]
    Check(ResolveArgs),

    /// Recommend a bundle from business requirements.
    #[command(
        about = "Recommend a pre-validated bundle",
        after_help = "EXAMPLES:\n\
            \x20 stackweave recommend --users 500\n\
            \x20 stackweave recommend --users 50000 --tenants 100 --budget high \\\n\
            \x20     --compliance soc2 --compliance hipaa --feature rbac"
    )]
    Recommend(RecommendArgs),

    /// List catalog services or bundles.
    #[command(
        visible_alias = "ls",
        about = "List catalog services or bundles",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 stackweave list services\n\
            \x20 stackweave list services --type database\n\
            \x20 stackweave list bundles"
    )]
    List(ListCommands),

    /// Initialise a Stackweave configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 stackweave init           # platform config location\n\
            \x20 stackweave init --local   # .stackweave.toml in CWD\n\
            \x20 stackweave init --force   # overwrite without asking"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 stackweave completions bash > ~/.local/share/bash-completion/completions/stackweave\n\
            \x20 stackweave completions zsh  > ~/.zfunc/_stackweave\n\
            \x20 stackweave completions fish > ~/.config/fish/completions/stackweave.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the effective configuration.
    #[command(
        about = "Configuration inspection",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 stackweave config get scoring.error_penalty\n\
            \x20 stackweave config list\n\
            \x20 stackweave config path"
    )]
    Config(ConfigCommands),
}

// ── resolve / check ───────────────────────────────────────────────────────────

/// Arguments shared by `stackweave resolve` and `stackweave check`.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Services as `type:provider[+tag...]`.
    #[arg(
        value_name = "SERVICE",
        required = true,
        num_args = 1..,
        value_parser = ServiceIdentifier::parse,
        help = "Services, e.g. database:postgresql+multi-tenant"
    )]
    pub services: Vec<ServiceIdentifier>,

    #[command(flatten)]
    pub context: ContextArgs,

    /// Exit with code 5 when the stack has error-severity issues.
    #[arg(long = "strict", help = "Fail (exit 5) when the stack is incompatible")]
    pub strict: bool,
}

/// Deployment context flags.
#[derive(Debug, Default, Args)]
pub struct ContextArgs {
    #[arg(
        short = 'e',
        long = "env",
        value_name = "ENV",
        value_parser = parse_value::<Environment>,
        help = "Deployment environment: development, staging, production"
    )]
    pub environment: Option<Environment>,

    #[arg(
        long = "load",
        value_name = "LOAD",
        value_parser = parse_value::<ExpectedLoad>,
        help = "Expected load: low, medium, high, enterprise"
    )]
    pub load: Option<ExpectedLoad>,

    #[arg(
        long = "tenancy",
        value_name = "STRATEGY",
        value_parser = parse_value::<TenancyStrategy>,
        help = "Multi-tenancy strategy: rls, schema-per-tenant, database-per-tenant, shared-database"
    )]
    pub tenancy: Option<TenancyStrategy>,

    #[arg(
        long = "isolation",
        value_name = "LEVEL",
        requires = "tenancy",
        value_parser = parse_value::<IsolationLevel>,
        help = "Tenant isolation: basic, standard, strict"
    )]
    pub isolation: Option<IsolationLevel>,

    #[arg(
        long = "max-tenants",
        value_name = "N",
        requires = "tenancy",
        help = "Expected number of tenants"
    )]
    pub max_tenants: Option<u32>,

    #[arg(long = "horizontal", help = "Service scales horizontally")]
    pub horizontal: bool,

    #[arg(long = "serverless", help = "Service runs on serverless infrastructure")]
    pub serverless: bool,

    #[arg(
        long = "compliance",
        value_name = "FLAG",
        value_parser = parse_value::<Compliance>,
        help = "Compliance requirement (repeatable): gdpr, soc2, hipaa, pci-dss"
    )]
    pub compliance: Vec<Compliance>,

    #[arg(
        long = "latency",
        value_name = "LATENCY",
        value_parser = parse_value::<LatencyRequirement>,
        help = "Latency requirement: relaxed, standard, realtime"
    )]
    pub latency: Option<LatencyRequirement>,

    #[arg(
        long = "consistency",
        value_name = "LEVEL",
        value_parser = parse_value::<ConsistencyLevel>,
        help = "Consistency requirement: eventual, strong"
    )]
    pub consistency: Option<ConsistencyLevel>,
}

impl ContextArgs {
    /// Build the context, filling omitted environment and load from config.
    pub fn to_context(&self, defaults: &Defaults) -> CompatibilityContext {
        let mut context = CompatibilityContext::new(self.environment.unwrap_or(defaults.environment))
            .with_load(self.load.unwrap_or(defaults.expected_load))
            .with_scaling(ScalingFlags {
                horizontal: self.horizontal,
                serverless: self.serverless,
                auto_scaling: false,
            });

        if let Some(strategy) = self.tenancy {
            let mut tenancy = MultiTenancy::new(strategy);
            if let Some(isolation) = self.isolation {
                tenancy = tenancy.isolation(isolation);
            }
            if let Some(max) = self.max_tenants {
                tenancy = tenancy.max_tenants(max);
            }
            context = context.with_multi_tenancy(tenancy);
        }
        if let Some(latency) = self.latency {
            context = context.with_latency(latency);
        }
        if let Some(consistency) = self.consistency {
            context = context.with_consistency(consistency);
        }
        self.compliance
            .iter()
            .fold(context, |ctx, flag| ctx.with_compliance(*flag))
    }
}

// ── recommend ─────────────────────────────────────────────────────────────────

/// Arguments for `stackweave recommend`.
#[derive(Debug, Args)]
pub struct RecommendArgs {
    #[arg(long = "users", value_name = "N", default_value_t = 0, help = "Expected users")]
    pub users: u64,

    #[arg(long = "tenants", value_name = "N", default_value_t = 0, help = "Expected tenants")]
    pub tenants: u64,

    #[arg(
        long = "budget",
        value_name = "TIER",
        value_parser = parse_value::<BudgetTier>,
        help = "Budget: low, medium, high, enterprise [default: low]"
    )]
    pub budget: Option<BudgetTier>,

    #[arg(
        long = "team",
        value_name = "SIZE",
        value_parser = parse_value::<TeamSize>,
        help = "Team size: solo, small, medium, large [default: small]"
    )]
    pub team: Option<TeamSize>,

    #[arg(
        long = "timeline",
        value_name = "TIMELINE",
        value_parser = parse_value::<Timeline>,
        help = "Timeline: urgent, standard, flexible"
    )]
    pub timeline: Option<Timeline>,

    #[arg(
        long = "compliance",
        value_name = "FLAG",
        value_parser = parse_value::<Compliance>,
        help = "Compliance requirement (repeatable): gdpr, soc2, hipaa, pci-dss"
    )]
    pub compliance: Vec<Compliance>,

    #[arg(long = "feature", value_name = "NAME", help = "Required feature (repeatable)")]
    pub features: Vec<String>,

    #[arg(
        long = "existing",
        value_name = "PROVIDER",
        help = "Provider already in use (repeatable); enables a migration path"
    )]
    pub existing: Vec<String>,
}

impl RecommendArgs {
    pub fn to_requirements(&self) -> Result<BusinessRequirements, DomainError> {
        let mut builder = BusinessRequirements::builder()
            .expected_users(self.users)
            .expected_tenants(self.tenants);
        if let Some(budget) = self.budget {
            builder = builder.budget(budget);
        }
        if let Some(team) = self.team {
            builder = builder.team_size(team);
        }
        if let Some(timeline) = self.timeline {
            builder = builder.timeline(timeline);
        }
        for flag in &self.compliance {
            builder = builder.compliance(*flag);
        }
        for feature in &self.features {
            builder = builder.feature(feature);
        }
        for provider in &self.existing {
            builder = builder.existing_infrastructure(provider);
        }
        builder.build()
    }
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Subcommands for `stackweave list`.
#[derive(Debug, Subcommand)]
pub enum ListCommands {
    /// Catalog services, grouped by type.
    Services {
        /// Only this service type (e.g. `database`).
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        service_type: Option<String>,
    },
    /// Pre-validated bundles.
    Bundles,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `stackweave init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to `.stackweave.toml` in the current directory.
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `stackweave completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `stackweave config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `scoring.error_penalty`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

/// clap value parser backed by the domain's `FromStr` impls.
fn parse_value<T>(raw: &str) -> Result<T, DomainError>
where
    T: std::str::FromStr<Err = DomainError>,
{
    raw.parse()
}

// ── tests ─────────────────────────────────────────────────────────────────────
