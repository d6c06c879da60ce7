//! Built-in rule registry.
//!
//! # Adding a Rule
//!
//! 1. Write the predicate below, next to the family it belongs to
//! 2. Append one [`CompatibilityRule`] entry to [`BUILTIN_RULES`]
//! 3. Never reorder or remove entries; the list is append-only
//!
//! Rule ids are part of the public output (JSON reports, `--strict` gates)
//! and must stay unique; `rule_ids_are_unique` enforces it.

use std::borrow::Cow;

use crate::domain::{
    entities::{CompatibilityContext, ServiceIdentifier},
    rules::{CompatibilityRule, RuleCheck},
    value_objects::{
        Compliance, ConsistencyLevel, IsolationLevel, LatencyRequirement, Severity,
        TenancyStrategy,
    },
};

/// Providers with native row-level security.
const RLS_DATABASES: &[&str] = &["postgresql", "supabase"];

/// Auth providers with organisation / role support.
const TENANT_AWARE_AUTH: &[&str] = &["better-auth", "clerk", "auth0"];

/// Above this many tenants, one database per tenant stops being manageable.
const DATABASE_PER_TENANT_LIMIT: u32 = 1_000;

const fn rule(
    id: &'static str,
    severity: Severity,
    check: RuleCheck,
    message: &'static str,
) -> CompatibilityRule {
    CompatibilityRule {
        id: Cow::Borrowed(id),
        severity,
        check,
        message: Cow::Borrowed(message),
    }
}

/// Single source of truth for the default rule set, in evaluation order.
pub static BUILTIN_RULES: &[CompatibilityRule] = &[
    // ── Database ────────────────────────────────────────────────────────────
    rule(
        "sqlite-production",
        Severity::Warning,
        RuleCheck::Set(sqlite_in_production),
        "{{SERVICES}} is an embedded database and is not recommended in {{ENVIRONMENT}}",
    ),
    rule(
        "sqlite-high-load",
        Severity::Error,
        RuleCheck::Set(sqlite_under_heavy_load),
        "{{SERVICES}} cannot sustain {{LOAD}} load in {{ENVIRONMENT}}; use a client/server database",
    ),
    rule(
        "sqlite-horizontal-scaling",
        Severity::Error,
        RuleCheck::Set(sqlite_with_scale_out),
        "{{SERVICES}} stores data on local disk and cannot be shared between scaled-out or serverless instances",
    ),
    rule(
        "duplicate-capability",
        Severity::Warning,
        RuleCheck::Pairwise(same_capability),
        "{{SERVICES}} provide the same capability; keep only one",
    ),
    rule(
        "payment-durable-store",
        Severity::Warning,
        RuleCheck::Pairwise(payment_on_embedded_store),
        "{{SERVICES}}: payment records need a durable, concurrent datastore",
    ),
    // ── Multi-tenancy ───────────────────────────────────────────────────────
    rule(
        "tenancy-rls-support",
        Severity::Error,
        RuleCheck::Set(rls_without_support),
        "{{STRATEGY}} tenancy requires a database with row-level security (found: {{SERVICES}})",
    ),
    rule(
        "tenancy-database-tag",
        Severity::Warning,
        RuleCheck::Set(tenancy_without_tagged_database),
        "{{STRATEGY}} tenancy without a database configured for multi-tenancy (found: {{SERVICES}}); add the multi-tenant tag",
    ),
    rule(
        "tenancy-rbac",
        Severity::Warning,
        RuleCheck::Set(tenancy_without_rbac),
        "multi-tenant stacks need tenant-aware role-based access control (auth found: {{SERVICES}})",
    ),
    rule(
        "tenancy-shared-strict",
        Severity::Error,
        RuleCheck::Set(shared_database_with_strict_isolation),
        "{{STRATEGY}} cannot provide {{ISOLATION}} isolation; use schema-per-tenant or database-per-tenant",
    ),
    rule(
        "tenancy-database-per-tenant-scale",
        Severity::Warning,
        RuleCheck::Set(too_many_tenant_databases),
        "{{STRATEGY}} becomes hard to operate beyond 1000 tenants; consider row-level-security",
    ),
    // ── Compliance ──────────────────────────────────────────────────────────
    rule(
        "compliance-embedded-database",
        Severity::Error,
        RuleCheck::Set(compliance_on_embedded_database),
        "{{SERVICES}} lacks the access auditing and encryption controls SOC 2 and HIPAA require",
    ),
    rule(
        "compliance-payment-provider",
        Severity::Info,
        RuleCheck::Set(pci_without_hosted_payments),
        "PCI-DSS scope is smallest with a hosted payment provider; none found",
    ),
    // ── Scaling and performance ─────────────────────────────────────────────
    rule(
        "scaling-shared-cache",
        Severity::Info,
        RuleCheck::Set(scale_out_without_cache),
        "horizontally scaled instances usually need a shared cache for sessions and rate limits",
    ),
    rule(
        "latency-cache",
        Severity::Info,
        RuleCheck::Set(realtime_without_cache),
        "realtime latency targets are hard to meet without a cache",
    ),
    rule(
        "consistency-document-store",
        Severity::Warning,
        RuleCheck::Set(strong_consistency_on_document_store),
        "{{SERVICES}} defaults to eventual consistency; strong consistency needs majority read/write concerns",
    ),
];

// ── Helpers ──────────────────────────────────────────────────────────────────

fn is_sqlite(service: &ServiceIdentifier) -> bool {
    service.is("database", "sqlite")
}

fn of_type<'a>(
    services: &'a [ServiceIdentifier],
    service_type: &'a str,
) -> impl Iterator<Item = &'a ServiceIdentifier> {
    services.iter().filter(move |s| s.is_type(service_type))
}

/// `Some(matching)` when at least one service matches.
fn offending(
    services: &[ServiceIdentifier],
    pred: impl Fn(&ServiceIdentifier) -> bool,
) -> Option<Vec<ServiceIdentifier>> {
    let found: Vec<_> = services.iter().filter(|s| pred(s)).cloned().collect();
    (!found.is_empty()).then_some(found)
}

fn supports_rls(service: &ServiceIdentifier) -> bool {
    service.is_type("database")
        && (RLS_DATABASES.contains(&service.provider.as_str()) || service.has_tag("rls"))
}

fn is_tenant_aware_auth(service: &ServiceIdentifier) -> bool {
    service.is_type("auth")
        && (service.has_tag("rbac") || TENANT_AWARE_AUTH.contains(&service.provider.as_str()))
}

// ── Database ─────────────────────────────────────────────────────────────────

fn sqlite_in_production(
    services: &[ServiceIdentifier],
    ctx: &CompatibilityContext,
) -> Option<Vec<ServiceIdentifier>> {
    if !ctx.is_production() {
        return None;
    }
    offending(services, is_sqlite)
}

fn sqlite_under_heavy_load(
    services: &[ServiceIdentifier],
    ctx: &CompatibilityContext,
) -> Option<Vec<ServiceIdentifier>> {
    if !(ctx.is_production() && ctx.performance.expected_load.is_heavy()) {
        return None;
    }
    offending(services, is_sqlite)
}

fn sqlite_with_scale_out(
    services: &[ServiceIdentifier],
    ctx: &CompatibilityContext,
) -> Option<Vec<ServiceIdentifier>> {
    if !(ctx.scaling.horizontal || ctx.scaling.serverless) {
        return None;
    }
    offending(services, is_sqlite)
}

fn same_capability(a: &ServiceIdentifier, b: &ServiceIdentifier, _: &CompatibilityContext) -> bool {
    a.service_type == b.service_type && a.provider != b.provider
}

fn payment_on_embedded_store(
    a: &ServiceIdentifier,
    b: &ServiceIdentifier,
    _: &CompatibilityContext,
) -> bool {
    (a.is_type("payment") && is_sqlite(b)) || (b.is_type("payment") && is_sqlite(a))
}

// ── Multi-tenancy ────────────────────────────────────────────────────────────

/// Names every database without row-level security. A stack with no database
/// passes.
fn rls_without_support(
    services: &[ServiceIdentifier],
    ctx: &CompatibilityContext,
) -> Option<Vec<ServiceIdentifier>> {
    if ctx.tenancy_strategy() != Some(TenancyStrategy::RowLevelSecurity) {
        return None;
    }
    offending(services, |s| s.is_type("database") && !supports_rls(s))
}

fn tenancy_without_tagged_database(
    services: &[ServiceIdentifier],
    ctx: &CompatibilityContext,
) -> Option<Vec<ServiceIdentifier>> {
    ctx.multi_tenancy?;
    offending(services, |s| s.is_type("database") && !s.has_tag("multi-tenant"))
}

/// Fires with no auth provider at all, otherwise names each provider that is
/// not tenant-aware.
fn tenancy_without_rbac(
    services: &[ServiceIdentifier],
    ctx: &CompatibilityContext,
) -> Option<Vec<ServiceIdentifier>> {
    ctx.multi_tenancy?;
    let mut auth = of_type(services, "auth").peekable();
    if auth.peek().is_none() {
        return Some(Vec::new());
    }
    offending(services, |s| s.is_type("auth") && !is_tenant_aware_auth(s))
}

fn shared_database_with_strict_isolation(
    services: &[ServiceIdentifier],
    ctx: &CompatibilityContext,
) -> Option<Vec<ServiceIdentifier>> {
    let tenancy = ctx.multi_tenancy?;
    if tenancy.strategy != TenancyStrategy::SharedDatabase
        || tenancy.isolation != IsolationLevel::Strict
    {
        return None;
    }
    Some(of_type(services, "database").cloned().collect())
}

fn too_many_tenant_databases(
    services: &[ServiceIdentifier],
    ctx: &CompatibilityContext,
) -> Option<Vec<ServiceIdentifier>> {
    let tenancy = ctx.multi_tenancy?;
    if tenancy.strategy != TenancyStrategy::DatabasePerTenant
        || tenancy.max_tenants <= DATABASE_PER_TENANT_LIMIT
    {
        return None;
    }
    Some(of_type(services, "database").cloned().collect())
}

// ── Compliance ───────────────────────────────────────────────────────────────

fn compliance_on_embedded_database(
    services: &[ServiceIdentifier],
    ctx: &CompatibilityContext,
) -> Option<Vec<ServiceIdentifier>> {
    if !(ctx.requires(Compliance::Soc2) || ctx.requires(Compliance::Hipaa)) {
        return None;
    }
    offending(services, is_sqlite)
}

fn pci_without_hosted_payments(
    services: &[ServiceIdentifier],
    ctx: &CompatibilityContext,
) -> Option<Vec<ServiceIdentifier>> {
    if !ctx.requires(Compliance::PciDss) || of_type(services, "payment").next().is_some() {
        return None;
    }
    Some(Vec::new())
}

// ── Scaling and performance ──────────────────────────────────────────────────

fn scale_out_without_cache(
    services: &[ServiceIdentifier],
    ctx: &CompatibilityContext,
) -> Option<Vec<ServiceIdentifier>> {
    if !ctx.scaling.horizontal || of_type(services, "cache").next().is_some() {
        return None;
    }
    Some(Vec::new())
}

fn realtime_without_cache(
    services: &[ServiceIdentifier],
    ctx: &CompatibilityContext,
) -> Option<Vec<ServiceIdentifier>> {
    if ctx.performance.latency != LatencyRequirement::Realtime
        || of_type(services, "cache").next().is_some()
    {
        return None;
    }
    Some(Vec::new())
}

fn strong_consistency_on_document_store(
    services: &[ServiceIdentifier],
    ctx: &CompatibilityContext,
) -> Option<Vec<ServiceIdentifier>> {
    if ctx.performance.consistency != ConsistencyLevel::Strong {
        return None;
    }
    offending(services, |s| s.is("database", "mongodb"))
}
