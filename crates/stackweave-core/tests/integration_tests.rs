//! Integration tests for stackweave-core.
//!
//! The application services run against `mockall` stores so every test
//! controls the exact catalog snapshot the facade sees.

use std::sync::Arc;

use mockall::mock;
use stackweave_core::{
    application::{ApplicationError, CatalogService, RecommendationService, ResolutionService},
    application::ports::{BundleStore, CatalogStore},
    domain::{
        Bundle, BundleCatalog, BundleCategory, BundleRequirements, BundleServices, BudgetTier,
        BusinessRequirements, CompatibilityContext, Compliance, ConsistencyLevel, DomainError,
        EnvVariable, Environment, ExpectedLoad, MultiTenancy, PenaltyTable, PricingTier,
        RecommendationOutcome, RuleSet, ServiceCatalog, ServiceIdentifier, ServicePattern,
        ServiceTemplate, Severity, TeamSize, TenancyStrategy, Verdict,
    },
    error::{StackweaveError, StackweaveResult},
};

mock! {
    pub Catalog {}

    impl CatalogStore for Catalog {
        fn snapshot(&self) -> StackweaveResult<Arc<ServiceCatalog>>;
        fn register(&self, template: ServiceTemplate) -> StackweaveResult<()>;
    }
}

mock! {
    pub Bundles {}

    impl BundleStore for Bundles {
        fn snapshot(&self) -> StackweaveResult<Arc<BundleCatalog>>;
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn svc(text: &str) -> ServiceIdentifier {
    ServiceIdentifier::parse(text).unwrap()
}

fn pattern(text: &str) -> ServicePattern {
    ServicePattern::parse(text).unwrap()
}

fn template(id: &str) -> stackweave_core::domain::entities::ServiceTemplateBuilder {
    let id = svc(id);
    ServiceTemplate::builder(id.service_type, id.provider)
}

fn saas_templates() -> Vec<ServiceTemplate> {
    vec![
        template("database:postgresql")
            .default_for_type(true)
            .tag("sql")
            .tag("rls")
            .injection_point("src/db/client.ts", 100)
            .injection_point("drizzle.config.ts", 95)
            .env(EnvVariable::required("DATABASE_URL").describe("Postgres connection string"))
            .post_install("npx drizzle-kit generate")
            .build()
            .unwrap(),
        template("database:sqlite")
            .tag("sql")
            .tag("embedded")
            .injection_point("src/db/client.ts", 100)
            .env(EnvVariable::optional("DATABASE_URL"))
            .build()
            .unwrap(),
        template("database:mysql")
            .tag("sql")
            .injection_point("src/db/client.ts", 100)
            .build()
            .unwrap(),
        template("database:mongodb")
            .tag("document")
            .injection_point("src/db/client.ts", 100)
            .build()
            .unwrap(),
        template("auth:better-auth")
            .depends_on(pattern("database:*"))
            .injection_point("src/auth.ts", 80)
            .env(EnvVariable::required("BETTER_AUTH_SECRET"))
            .env(EnvVariable::optional("DATABASE_URL"))
            .post_install("npx @better-auth/cli migrate")
            .build()
            .unwrap(),
        template("auth:clerk")
            .tag("rbac")
            .conflicts_with(pattern("auth:better-auth"))
            .injection_point("src/middleware.ts", 85)
            .env(EnvVariable::required("CLERK_SECRET_KEY"))
            .build()
            .unwrap(),
        template("payment:stripe")
            .depends_on(pattern("database:*"))
            .injection_point("src/payments.ts", 60)
            .env(EnvVariable::required("STRIPE_SECRET_KEY"))
            .build()
            .unwrap(),
        template("cache:redis")
            .injection_point("src/cache.ts", 90)
            .env(EnvVariable::required("REDIS_URL"))
            .build()
            .unwrap(),
    ]
}

fn store_of(catalog: ServiceCatalog) -> Arc<dyn CatalogStore> {
    let catalog = Arc::new(catalog);
    let mut store = MockCatalog::new();
    store
        .expect_snapshot()
        .returning(move || Ok(Arc::clone(&catalog)));
    Arc::new(store)
}

fn resolution_service(templates: Vec<ServiceTemplate>) -> ResolutionService {
    let catalog = ServiceCatalog::from_templates(templates).unwrap();
    ResolutionService::new(store_of(catalog), Arc::new(RuleSet::builtin()))
}

fn ids(services: &[ServiceIdentifier]) -> Vec<String> {
    services.iter().map(ServiceIdentifier::id).collect()
}

fn bundle(
    id: &str,
    category: BundleCategory,
    core: &[&str],
    budget: BudgetTier,
    pricing: PricingTier,
    features: &[&str],
    compliance: &[Compliance],
) -> Bundle {
    Bundle {
        id: id.into(),
        name: id.into(),
        description: format!("{id} bundle"),
        category,
        services: BundleServices {
            core: core.iter().map(|s| svc(s)).collect(),
            optional: Vec::new(),
        },
        requirements: BundleRequirements {
            budget,
            team_size: TeamSize::Solo,
            expected_load: ExpectedLoad::Medium,
        },
        pricing_tier: pricing,
        features: features.iter().map(|f| f.to_string()).collect(),
        compliance: compliance.iter().copied().collect(),
    }
}

fn bundle_catalog() -> BundleCatalog {
    BundleCatalog::new([
        bundle(
            "starter",
            BundleCategory::Starter,
            &["database:sqlite", "auth:better-auth"],
            BudgetTier::Low,
            PricingTier::Free,
            &["auth"],
            &[],
        ),
        bundle(
            "saas-starter",
            BundleCategory::Saas,
            &["database:postgresql+multi-tenant", "auth:better-auth", "payment:stripe"],
            BudgetTier::Medium,
            PricingTier::Starter,
            &["auth", "billing", "multi-tenancy"],
            &[Compliance::Gdpr],
        ),
        bundle(
            "enterprise",
            BundleCategory::Enterprise,
            &[
                "database:postgresql+multi-tenant",
                "auth:clerk+rbac",
                "cache:redis",
                "monitoring:sentry",
            ],
            BudgetTier::High,
            PricingTier::Enterprise,
            &["auth", "rbac", "sso", "audit-log", "multi-tenancy"],
            &[Compliance::Gdpr, Compliance::Soc2, Compliance::Hipaa],
        ),
    ])
    .unwrap()
}

fn recommendation_service(bundles: BundleCatalog) -> RecommendationService {
    let bundles = Arc::new(bundles);
    let mut store = MockBundles::new();
    store
        .expect_snapshot()
        .returning(move || Ok(Arc::clone(&bundles)));
    RecommendationService::new(Arc::new(store), Arc::new(RuleSet::builtin()))
}

fn saas_context() -> CompatibilityContext {
    CompatibilityContext::production()
        .with_load(ExpectedLoad::Medium)
        .with_multi_tenancy(MultiTenancy::new(TenancyStrategy::RowLevelSecurity).max_tenants(50))
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn sqlite_under_production_high_load_is_incompatible() {
    let service = resolution_service(saas_templates());
    let context = CompatibilityContext::production().with_load(ExpectedLoad::High);

    let result = service.resolve(&[svc("database:sqlite")], &context).unwrap();

    assert!(!result.compatible);
    assert_eq!(result.verdict, Verdict::Fail);
    assert!(result.score < 50);
    assert!(
        result
            .issues
            .iter()
            .any(|i| i.severity == Severity::Error && i.affects_provider("sqlite"))
    );
}

#[test]
fn multi_tenant_saas_stack_resolves_cleanly() {
    let service = resolution_service(saas_templates());

    let result = service
        .resolve(
            &[svc("database:postgresql+multi-tenant"), svc("auth:better-auth")],
            &saas_context(),
        )
        .unwrap();

    assert!(result.compatible);
    assert!(result.score > 70);
    assert!(result.contains("database", "postgresql"));
    assert!(result.contains("auth", "better-auth"));
    assert!(result.missing.is_empty());
    assert!(result.implied.is_empty());
    assert!(result.position("database", "postgresql") < result.position("auth", "better-auth"));
    // requested and catalog tags are merged
    let db = &result.resolved_order[0];
    assert!(db.has_tag("multi-tenant") && db.has_tag("rls"));
}

#[test]
fn mutual_dependency_is_a_cycle() {
    let service = resolution_service(vec![
        template("svc:a").depends_on(pattern("svc:b")).build().unwrap(),
        template("svc:b").depends_on(pattern("svc:a")).build().unwrap(),
    ]);

    let err = service
        .resolve(&[svc("svc:a")], &CompatibilityContext::default())
        .unwrap_err();

    match err {
        StackweaveError::Domain(DomainError::CyclicDependency { cycle }) => {
            assert_eq!(cycle, ["svc:a", "svc:b"]);
        }
        other => panic!("expected a cycle, got {other:?}"),
    }
}

#[test]
fn unmatched_dependency_is_reported_missing_with_partial_order() {
    let service = resolution_service(vec![
        template("payment:stripe")
            .depends_on(pattern("database:*"))
            .env(EnvVariable::required("STRIPE_SECRET_KEY"))
            .build()
            .unwrap(),
        template("email:resend").build().unwrap(),
    ]);

    let result = service
        .resolve(&[svc("payment:stripe")], &CompatibilityContext::default())
        .unwrap();

    assert_eq!(ids(&result.resolved_order), ["payment:stripe"]);
    assert_eq!(ids(&result.missing), ["database:*"]);
    let unmet: Vec<_> = result
        .issues
        .iter()
        .filter(|i| i.rule_id == "unmet-dependency")
        .collect();
    assert_eq!(unmet.len(), 1);
    assert_eq!(unmet[0].severity, Severity::Warning);
    assert!(result.compatible);
}

#[test]
fn enterprise_requirements_recommend_enterprise_bundle() {
    let service = recommendation_service(bundle_catalog());
    let requirements = BusinessRequirements::builder()
        .expected_users(100_000)
        .expected_tenants(5_000)
        .budget(BudgetTier::High)
        .compliance(Compliance::Gdpr)
        .compliance(Compliance::Soc2)
        .build()
        .unwrap();

    let outcome = service.recommend(&requirements).unwrap();
    let recommended = outcome.recommended().expect("a bundle should be recommended");

    assert_eq!(recommended.bundle.category, BundleCategory::Enterprise);
    assert!(recommended.bundle.has_feature("rbac"));
    assert!(!recommended.reasoning.is_empty());
}

// ============================================================================
// Facade behavior
// ============================================================================

#[test]
fn implied_dependencies_use_the_catalog_default() {
    let service = resolution_service(saas_templates());

    let result = service
        .resolve(&[svc("payment:stripe")], &CompatibilityContext::default())
        .unwrap();

    assert_eq!(ids(&result.resolved_order), ["database:postgresql", "payment:stripe"]);
    assert_eq!(ids(&result.implied), ["database:postgresql"]);
}

#[test]
fn plan_follows_resolved_order() {
    let service = resolution_service(saas_templates());

    let result = service
        .resolve(
            &[svc("auth:better-auth"), svc("payment:stripe")],
            &CompatibilityContext::default(),
        )
        .unwrap();

    let plan_services: Vec<_> = result.injection_plan.iter().map(|s| s.service.id()).collect();
    assert_eq!(plan_services, ids(&result.resolved_order));

    let db_points: Vec<_> = result.injection_plan[0]
        .points
        .iter()
        .map(|p| p.priority)
        .collect();
    assert_eq!(db_points, [100, 95]);

    // DATABASE_URL declared by postgresql first, better-auth's copy dropped
    let names: Vec<_> = result.env_variables.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names.iter().filter(|n| **n == "DATABASE_URL").count(), 1);
    let database_url = result
        .env_variables
        .iter()
        .find(|v| v.name == "DATABASE_URL")
        .unwrap();
    assert!(database_url.required);

    let commands: Vec<_> = result
        .post_install_steps
        .iter()
        .map(|s| s.command.as_str())
        .collect();
    assert_eq!(commands, ["npx drizzle-kit generate", "npx @better-auth/cli migrate"]);
}

#[test]
fn declared_conflict_fails_the_stack() {
    let service = resolution_service(saas_templates());

    let result = service
        .resolve(
            &[svc("auth:clerk"), svc("auth:better-auth"), svc("database:postgresql")],
            &CompatibilityContext::default(),
        )
        .unwrap();

    assert!(!result.compatible);
    assert!(result.issues.iter().any(|i| i.rule_id == "declared-conflict"));
}

#[test]
fn unknown_requested_service_is_not_found() {
    let service = resolution_service(saas_templates());

    let err = service
        .resolve(&[svc("database:oracle")], &CompatibilityContext::default())
        .unwrap_err();

    assert!(matches!(
        err,
        StackweaveError::Domain(DomainError::ServiceNotFound { .. })
    ));
}

#[test]
fn store_failure_propagates() {
    let mut store = MockCatalog::new();
    store.expect_snapshot().returning(|| {
        Err(ApplicationError::CatalogUnavailable {
            reason: "directory missing".into(),
        }
        .into())
    });
    let service = ResolutionService::new(Arc::new(store), Arc::new(RuleSet::builtin()));

    let err = service
        .resolve(&[svc("database:postgresql")], &CompatibilityContext::default())
        .unwrap_err();
    assert!(err.is_retryable());
}

#[test]
fn check_merges_catalog_tags_without_expansion() {
    let service = resolution_service(saas_templates());
    let context = CompatibilityContext::production().with_multi_tenancy(MultiTenancy::new(
        TenancyStrategy::RowLevelSecurity,
    ));

    // postgresql carries `rls` in the catalog; no dependency expansion for stripe
    let eval = service
        .check(
            &[svc("payment:stripe"), svc("database:postgresql+multi-tenant"), svc("auth:clerk")],
            &context,
        )
        .unwrap();

    assert!(eval.compatible);
    assert_eq!(eval.verdict, Verdict::Pass);
}

#[test]
fn custom_penalties_flow_through_the_facade() {
    let service = resolution_service(saas_templates())
        .with_penalties(PenaltyTable::new(50, 25, 5).unwrap());
    let context = CompatibilityContext::production().with_load(ExpectedLoad::High);

    let result = service.resolve(&[svc("database:sqlite")], &context).unwrap();

    assert_eq!(result.score, 25);
}

#[test]
fn catalog_service_lists_and_registers() {
    let catalog = Arc::new(ServiceCatalog::from_templates(saas_templates()).unwrap());
    let mut store = MockCatalog::new();
    store
        .expect_snapshot()
        .returning(move || Ok(Arc::clone(&catalog)));
    store
        .expect_register()
        .withf(|t: &ServiceTemplate| t.provider == "upstash")
        .times(1)
        .returning(|_| Ok(()));

    let mut bundles = MockBundles::new();
    let bundle_snapshot = Arc::new(bundle_catalog());
    bundles
        .expect_snapshot()
        .returning(move || Ok(Arc::clone(&bundle_snapshot)));

    let service = CatalogService::new(Arc::new(store), Arc::new(bundles));

    let databases: Vec<_> = service
        .list_services(Some("database"))
        .unwrap()
        .into_iter()
        .map(|t| t.provider)
        .collect();
    assert_eq!(databases, ["mongodb", "mysql", "postgresql", "sqlite"]);
    assert_eq!(
        service.service_types().unwrap(),
        ["auth", "cache", "database", "payment"]
    );
    assert!(service.get("cache", "memcached").is_err());
    assert_eq!(service.list_bundles().unwrap().len(), 3);

    service
        .register(template("cache:upstash").build().unwrap())
        .unwrap();
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn resolution_is_deterministic() {
    let service = resolution_service(saas_templates());
    let requested = [
        svc("payment:stripe"),
        svc("cache:redis"),
        svc("auth:better-auth"),
        svc("database:sqlite"),
    ];
    let context = CompatibilityContext::production().with_load(ExpectedLoad::Medium);

    let first = service.resolve(&requested, &context).unwrap();
    for _ in 0..10 {
        let again = service.resolve(&requested, &context).unwrap();
        assert_eq!(again.resolved_order, first.resolved_order);
        assert_eq!(ids(&again.resolved_order), ids(&first.resolved_order));
        assert_eq!(again.score, first.score);
        assert_eq!(again.issues, first.issues);
    }
}

#[test]
fn dependencies_precede_dependents() {
    let templates = saas_templates();
    let catalog = ServiceCatalog::from_templates(templates.clone()).unwrap();
    let service = resolution_service(templates);

    let requests: [&[&str]; 4] = [
        &["payment:stripe"],
        &["auth:better-auth", "payment:stripe", "cache:redis"],
        &["payment:stripe", "database:mysql", "database:sqlite"],
        &["auth:better-auth", "database:mongodb"],
    ];

    for request in requests {
        let requested: Vec<_> = request.iter().map(|s| svc(s)).collect();
        let result = service
            .resolve(&requested, &CompatibilityContext::default())
            .unwrap();
        let order = &result.resolved_order;

        for (si, s) in order.iter().enumerate() {
            let template = catalog.get(&s.service_type, &s.provider).unwrap();
            for (di, d) in order.iter().enumerate() {
                if template.depends_on(d) {
                    assert!(di < si, "{} must precede {}", d.id(), s.id());
                }
            }
        }
    }
}

#[test]
fn every_cycle_length_is_detected() {
    for len in 2..=6 {
        let templates: Vec<_> = (0..len)
            .map(|i| {
                let next = (i + 1) % len;
                template(&format!("ring:n{i}"))
                    .depends_on(pattern(&format!("ring:n{next}")))
                    .build()
                    .unwrap()
            })
            .collect();
        let service = resolution_service(templates);

        for start in 0..len {
            let err = service
                .resolve(&[svc(&format!("ring:n{start}"))], &CompatibilityContext::default())
                .unwrap_err();
            match err {
                StackweaveError::Domain(DomainError::CyclicDependency { cycle }) => {
                    assert_eq!(cycle.len(), len);
                }
                other => panic!("ring of {len}: expected a cycle, got {other:?}"),
            }
        }
    }
}

#[test]
fn adding_a_violating_service_never_raises_the_score() {
    let service = resolution_service(saas_templates());
    let context = CompatibilityContext::production()
        .with_load(ExpectedLoad::High)
        .with_consistency(ConsistencyLevel::Strong)
        .with_compliance(Compliance::Soc2);
    let base = vec![svc("database:postgresql"), svc("auth:clerk")];
    let base_score = service.check(&base, &context).unwrap().score;

    for extra in ["database:sqlite", "database:mysql", "database:mongodb"] {
        let mut extended = base.clone();
        extended.push(svc(extra));
        let score = service.check(&extended, &context).unwrap().score;
        assert!(score <= base_score, "adding {extra}: {score} > {base_score}");
    }
}

#[test]
fn adding_a_database_never_clears_a_tenancy_error() {
    let service = resolution_service(saas_templates());
    let context = CompatibilityContext::production()
        .with_multi_tenancy(MultiTenancy::new(TenancyStrategy::RowLevelSecurity));
    let base = vec![svc("database:mysql+multi-tenant"), svc("auth:clerk")];
    let base_result = service.check(&base, &context).unwrap();
    assert!(!base_result.compatible);
    assert!(base_result.issues.iter().any(|i| i.rule_id == "tenancy-rls-support"));

    for extra in [
        "database:postgresql",
        "database:postgresql+multi-tenant",
        "database:sqlite",
        "database:mongodb",
    ] {
        let mut extended = base.clone();
        extended.push(svc(extra));
        let result = service.check(&extended, &context).unwrap();
        assert!(
            result.score <= base_result.score,
            "adding {extra}: {} > {}",
            result.score,
            base_result.score
        );
        assert!(!result.compatible, "adding {extra} hid the mysql error");
    }
}

#[test]
fn compatible_iff_no_error_issue() {
    let service = resolution_service(saas_templates());
    let contexts = [
        CompatibilityContext::default(),
        CompatibilityContext::production().with_load(ExpectedLoad::Enterprise),
        saas_context(),
        CompatibilityContext::new(Environment::Staging).with_compliance(Compliance::Hipaa),
    ];
    let sets: [&[&str]; 4] = [
        &["database:sqlite"],
        &["database:postgresql", "auth:better-auth"],
        &["database:mongodb", "payment:stripe", "cache:redis"],
        &["database:mysql+multi-tenant", "auth:clerk"],
    ];

    for context in &contexts {
        for set in sets {
            let services: Vec<_> = set.iter().map(|s| svc(s)).collect();
            let result = service.resolve(&services, context).unwrap();
            let has_error = result.issues.iter().any(|i| i.severity == Severity::Error);
            assert_eq!(result.compatible, !has_error);
            assert_eq!(result.verdict == Verdict::Fail, has_error);
        }
    }
}

#[test]
fn over_budget_bundles_are_never_recommended() {
    let service = recommendation_service(bundle_catalog());

    for budget in [
        BudgetTier::Low,
        BudgetTier::Medium,
        BudgetTier::High,
        BudgetTier::Enterprise,
    ] {
        for users in [100, 5_000, 250_000] {
            let requirements = BusinessRequirements::builder()
                .expected_users(users)
                .budget(budget)
                .feature("rbac")
                .build()
                .unwrap();
            if let RecommendationOutcome::Recommended(rec) =
                service.recommend(&requirements).unwrap()
            {
                assert!(rec.bundle.requirements.budget <= budget);
            }
        }
    }
}
