//! Dependency resolution: expansion, cycle detection, ordering.
//!
//! ## Algorithm
//!
//! 1. **Expand** the requested set to a fixed point. For every dependency
//!    pattern no member satisfies, add the best catalog candidate (defaults
//!    first, then lexical provider order). Patterns with no candidate are
//!    recorded as missing and do not abort resolution.
//! 2. **Graph**: edge `D -> S` whenever `S` depends on a pattern matched by `D`.
//! 3. **Cycle check**: iterative three-color DFS from every node in lexical
//!    order, following dependencies. Once a gray node is reached, a BFS from
//!    each node (lexical order again) picks the shortest cycle; equal lengths
//!    keep the lexically first start.
//! 4. **Order**: Kahn's algorithm; among ready nodes the highest injection
//!    priority goes first, then lexical `(type, provider)`.
//!
//! Expansion is capped at `catalog size + requested size` rounds. Each round
//! adds at least one new catalog entry, so the cap is a safety net; hitting
//! it is reported as a cycle.

use std::{
    cmp::Reverse,
    collections::{BTreeMap, BTreeSet, HashMap, VecDeque},
};

use crate::domain::{
    DomainError,
    catalog::ServiceCatalog,
    entities::{ServiceIdentifier, ServiceKey, ServicePattern, ServiceTemplate},
};

/// A dependency pattern nothing in the catalog satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDependency {
    pub pattern: ServicePattern,
    /// Services declaring the dependency, in discovery order.
    pub required_by: Vec<ServiceIdentifier>,
}

/// Output of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGraph {
    /// Topological order: dependencies strictly before dependents.
    pub order: Vec<ServiceIdentifier>,
    /// Services added by expansion, in `order`.
    pub implied: Vec<ServiceIdentifier>,
    pub missing: Vec<MissingDependency>,
    /// `(dependency, dependent)` pairs.
    pub edges: Vec<(ServiceIdentifier, ServiceIdentifier)>,
    /// Pairs where one template declares a conflict with the other,
    /// in `order` positions `(earlier, later)`.
    pub conflicts: Vec<(ServiceIdentifier, ServiceIdentifier)>,
}

/// Resolves requested services against a catalog.
///
/// Holds only a borrowed catalog; every call allocates its own state.
#[derive(Debug, Clone, Copy)]
pub struct DependencyResolver<'a> {
    catalog: &'a ServiceCatalog,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(catalog: &'a ServiceCatalog) -> Self {
        Self { catalog }
    }

    /// Resolve `requested` to a full, ordered service set.
    ///
    /// # Errors
    ///
    /// - `InvalidIdentifier` for a malformed request (before anything runs)
    /// - `ServiceNotFound` when a directly requested service is unknown
    /// - `CyclicDependency` when the expanded graph contains a cycle
    pub fn resolve(&self, requested: &[ServiceIdentifier]) -> Result<ResolvedGraph, DomainError> {
        let roots = self.merge_requested(requested)?;
        let expansion = self.expand(roots)?;
        let graph = Graph::build(&expansion.nodes, &expansion.templates);

        if let Some(cycle) = graph.find_cycle(&expansion.nodes) {
            return Err(DomainError::CyclicDependency {
                cycle: cycle.iter().map(|&i| expansion.nodes[i].id()).collect(),
            });
        }

        let order_idx = graph.kahn_order(&expansion.nodes, &expansion.templates)?;

        let order: Vec<ServiceIdentifier> = order_idx
            .iter()
            .map(|&i| expansion.nodes[i].clone())
            .collect();
        let implied = order_idx
            .iter()
            .filter(|&&i| i >= expansion.root_count)
            .map(|&i| expansion.nodes[i].clone())
            .collect();

        let mut edges = Vec::new();
        for &s in &order_idx {
            for &d in &graph.dependencies[s] {
                edges.push((expansion.nodes[d].clone(), expansion.nodes[s].clone()));
            }
        }

        let mut conflicts = Vec::new();
        for (pos, &a) in order_idx.iter().enumerate() {
            for &b in &order_idx[pos + 1..] {
                let (ta, tb) = (expansion.templates[a], expansion.templates[b]);
                if ta.conflicts_with(&expansion.nodes[b]) || tb.conflicts_with(&expansion.nodes[a])
                {
                    conflicts.push((expansion.nodes[a].clone(), expansion.nodes[b].clone()));
                }
            }
        }

        Ok(ResolvedGraph {
            order,
            implied,
            missing: expansion.missing,
            edges,
            conflicts,
        })
    }

    /// Validate, deduplicate by identity (merging tags), and attach the
    /// template's capability tags.
    fn merge_requested(
        &self,
        requested: &[ServiceIdentifier],
    ) -> Result<Vec<ServiceIdentifier>, DomainError> {
        for service in requested {
            service.validate()?;
        }

        let mut merged: Vec<ServiceIdentifier> = Vec::with_capacity(requested.len());
        let mut index: HashMap<ServiceKey, usize> = HashMap::new();

        for service in requested {
            let template = self
                .catalog
                .require(&service.service_type, &service.provider)?;
            match index.get(&service.key()) {
                Some(&at) => merged[at].tags.extend(service.tags.iter().cloned()),
                None => {
                    index.insert(service.key(), merged.len());
                    merged.push(service.clone().with_tags(template.tags.iter().cloned()));
                }
            }
        }
        Ok(merged)
    }

    fn expand(&self, roots: Vec<ServiceIdentifier>) -> Result<Expansion<'a>, DomainError> {
        let cap = self.catalog.len() + roots.len();
        let root_count = roots.len();
        let mut templates: Vec<&'a ServiceTemplate> = Vec::with_capacity(roots.len());
        for root in &roots {
            templates.push(self.catalog.require(&root.service_type, &root.provider)?);
        }

        let mut nodes = roots;
        let mut missing: Vec<MissingDependency> = Vec::new();
        let mut rounds = 0usize;

        loop {
            let mut added = false;
            let snapshot = nodes.len();

            for i in 0..snapshot {
                let template = templates[i];
                for pattern in &template.dependencies {
                    let satisfied = nodes.iter().any(|member| {
                        !member.is(&template.service_type, &template.provider)
                            && pattern.matches(member)
                    });
                    if satisfied {
                        continue;
                    }

                    match self.catalog.best_match(pattern, &nodes[i]) {
                        Some(candidate) if !nodes.iter().any(|n| n.key() == candidate.key()) => {
                            nodes.push(candidate.identifier());
                            templates.push(candidate);
                            added = true;
                        }
                        Some(_) => {}
                        None => record_missing(&mut missing, pattern, &nodes[i]),
                    }
                }
            }

            if !added {
                break;
            }
            rounds += 1;
            if rounds > cap {
                return Err(DomainError::CyclicDependency { cycle: Vec::new() });
            }
        }

        Ok(Expansion {
            nodes,
            templates,
            root_count,
            missing,
        })
    }
}

fn record_missing(
    missing: &mut Vec<MissingDependency>,
    pattern: &ServicePattern,
    required_by: &ServiceIdentifier,
) {
    match missing.iter_mut().find(|m| &m.pattern == pattern) {
        Some(entry) => {
            if !entry.required_by.contains(required_by) {
                entry.required_by.push(required_by.clone());
            }
        }
        None => missing.push(MissingDependency {
            pattern: pattern.clone(),
            required_by: vec![required_by.clone()],
        }),
    }
}

struct Expansion<'a> {
    /// Roots first, then implied services in discovery order.
    nodes: Vec<ServiceIdentifier>,
    /// `templates[i]` belongs to `nodes[i]`.
    templates: Vec<&'a ServiceTemplate>,
    root_count: usize,
    missing: Vec<MissingDependency>,
}

// ============================================================================
// Graph
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

struct Graph {
    /// `dependencies[s]`: nodes `s` depends on, lexical order.
    dependencies: Vec<Vec<usize>>,
    /// `dependents[d]`: nodes depending on `d`.
    dependents: Vec<Vec<usize>>,
}

impl Graph {
    fn build(nodes: &[ServiceIdentifier], templates: &[&ServiceTemplate]) -> Self {
        let n = nodes.len();
        let mut dependencies = vec![Vec::new(); n];
        let mut dependents = vec![Vec::new(); n];

        for s in 0..n {
            for d in 0..n {
                if s != d && templates[s].depends_on(&nodes[d]) {
                    dependencies[s].push(d);
                    dependents[d].push(s);
                }
            }
            dependencies[s].sort_by(|&a, &b| nodes[a].cmp(&nodes[b]));
        }

        Self {
            dependencies,
            dependents,
        }
    }

    /// The shortest dependency cycle as node indices, if the graph has one.
    fn find_cycle(&self, nodes: &[ServiceIdentifier]) -> Option<Vec<usize>> {
        let mut starts: Vec<usize> = (0..nodes.len()).collect();
        starts.sort_by(|&a, &b| nodes[a].cmp(&nodes[b]));

        let first = self.first_cycle(&starts)?;
        let shortest = starts
            .iter()
            .filter_map(|&start| self.shortest_cycle_through(start))
            .fold(None::<Vec<usize>>, |best, cycle| match best {
                Some(best) if best.len() <= cycle.len() => Some(best),
                _ => Some(cycle),
            });
        Some(shortest.unwrap_or(first))
    }

    /// BFS along dependencies back to `start`. The path begins at `start`.
    fn shortest_cycle_through(&self, start: usize) -> Option<Vec<usize>> {
        let mut parent: Vec<Option<usize>> = vec![None; self.dependencies.len()];
        let mut queue = VecDeque::from([start]);

        while let Some(node) = queue.pop_front() {
            for &dep in &self.dependencies[node] {
                if dep == start {
                    let mut path = vec![node];
                    let mut current = node;
                    while let Some(prev) = parent[current] {
                        path.push(prev);
                        current = prev;
                    }
                    path.reverse();
                    return Some(path);
                }
                if parent[dep].is_none() {
                    parent[dep] = Some(node);
                    queue.push_back(dep);
                }
            }
        }
        None
    }

    /// Iterative three-color DFS. Returns the first cycle met, starting at
    /// the node that was found gray.
    fn first_cycle(&self, starts: &[usize]) -> Option<Vec<usize>> {
        let mut color = vec![Color::White; starts.len()];

        for &start in starts {
            if color[start] != Color::White {
                continue;
            }

            // (node, index of next dependency to visit)
            let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
            color[start] = Color::Gray;

            while let Some(frame) = stack.last_mut() {
                let node = frame.0;
                match self.dependencies[node].get(frame.1) {
                    Some(&dep) => {
                        frame.1 += 1;
                        match color[dep] {
                            Color::White => {
                                color[dep] = Color::Gray;
                                stack.push((dep, 0));
                            }
                            Color::Gray => {
                                let from = stack
                                    .iter()
                                    .position(|&(n, _)| n == dep)
                                    .unwrap_or_default();
                                return Some(stack[from..].iter().map(|&(n, _)| n).collect());
                            }
                            Color::Black => {}
                        }
                    }
                    None => {
                        color[node] = Color::Black;
                        stack.pop();
                    }
                }
            }
        }
        None
    }

    /// Kahn's algorithm with the priority / lexical tie-break.
    fn kahn_order(
        &self,
        nodes: &[ServiceIdentifier],
        templates: &[&ServiceTemplate],
    ) -> Result<Vec<usize>, DomainError> {
        let n = nodes.len();
        let mut remaining: Vec<usize> = self.dependencies.iter().map(Vec::len).collect();
        let mut ready: BTreeMap<(Reverse<i32>, ServiceKey), usize> = BTreeMap::new();
        let rank = |i: usize| (Reverse(templates[i].max_priority()), nodes[i].key());

        for (i, _) in remaining.iter().enumerate().filter(|&(_, &deg)| deg == 0) {
            ready.insert(rank(i), i);
        }

        let mut order = Vec::with_capacity(n);
        while let Some((_, node)) = ready.pop_first() {
            order.push(node);
            for &dependent in &self.dependents[node] {
                remaining[dependent] -= 1;
                if remaining[dependent] == 0 {
                    ready.insert(rank(dependent), dependent);
                }
            }
        }

        if order.len() != n {
            // find_cycle already ran; only reachable if the two passes disagree
            let stuck: BTreeSet<String> = (0..n)
                .filter(|&i| remaining[i] > 0)
                .map(|i| nodes[i].id())
                .collect();
            return Err(DomainError::CyclicDependency {
                cycle: stuck.into_iter().collect(),
            });
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(id: &str) -> crate::domain::entities::ServiceTemplateBuilder {
        let key = ServiceIdentifier::parse(id).unwrap();
        ServiceTemplate::builder(key.service_type, key.provider)
    }

    fn pattern(text: &str) -> ServicePattern {
        ServicePattern::parse(text).unwrap()
    }

    fn svc(text: &str) -> ServiceIdentifier {
        ServiceIdentifier::parse(text).unwrap()
    }

    fn ids(services: &[ServiceIdentifier]) -> Vec<String> {
        services.iter().map(ServiceIdentifier::id).collect()
    }

    fn catalog(templates: Vec<ServiceTemplate>) -> ServiceCatalog {
        ServiceCatalog::from_templates(templates).unwrap()
    }

    fn saas_catalog() -> ServiceCatalog {
        catalog(vec![
            template("database:postgresql")
                .tag("rls")
                .default_for_type(true)
                .injection_point("src/db/client.ts", 100)
                .build()
                .unwrap(),
            template("database:sqlite")
                .injection_point("src/db/client.ts", 100)
                .build()
                .unwrap(),
            template("auth:better-auth")
                .depends_on(pattern("database:*"))
                .injection_point("src/auth.ts", 80)
                .build()
                .unwrap(),
            template("payment:stripe")
                .depends_on(pattern("database:*"))
                .depends_on(pattern("email:*"))
                .injection_point("src/payments.ts", 60)
                .build()
                .unwrap(),
            template("cache:redis")
                .injection_point("src/cache.ts", 90)
                .build()
                .unwrap(),
        ])
    }

    #[test]
    fn dependency_comes_before_dependent() {
        let catalog = saas_catalog();
        let graph = DependencyResolver::new(&catalog)
            .resolve(&[svc("auth:better-auth"), svc("database:postgresql")])
            .unwrap();
        assert_eq!(ids(&graph.order), ["database:postgresql", "auth:better-auth"]);
        assert!(graph.implied.is_empty());
        assert!(graph.missing.is_empty());
    }

    #[test]
    fn expansion_prefers_catalog_default() {
        let catalog = saas_catalog();
        let graph = DependencyResolver::new(&catalog)
            .resolve(&[svc("auth:better-auth")])
            .unwrap();
        assert_eq!(ids(&graph.implied), ["database:postgresql"]);
        assert!(graph.order[0].has_tag("rls"));
    }

    #[test]
    fn expansion_falls_back_to_lexical_provider() {
        let catalog = catalog(vec![
            template("database:sqlite").build().unwrap(),
            template("database:mysql").build().unwrap(),
            template("auth:clerk")
                .depends_on(pattern("database:*"))
                .build()
                .unwrap(),
        ]);
        let graph = DependencyResolver::new(&catalog)
            .resolve(&[svc("auth:clerk")])
            .unwrap();
        assert_eq!(ids(&graph.implied), ["database:mysql"]);
    }

    #[test]
    fn unmatched_pattern_is_missing_not_fatal() {
        let catalog = saas_catalog();
        let graph = DependencyResolver::new(&catalog)
            .resolve(&[svc("payment:stripe")])
            .unwrap();
        assert_eq!(graph.missing.len(), 1);
        assert_eq!(graph.missing[0].pattern.to_string(), "email:*");
        assert_eq!(ids(&graph.missing[0].required_by), ["payment:stripe"]);
        assert_eq!(ids(&graph.order), ["database:postgresql", "payment:stripe"]);
    }

    #[test]
    fn unknown_requested_service_is_not_found() {
        let catalog = saas_catalog();
        let err = DependencyResolver::new(&catalog)
            .resolve(&[svc("database:oracle")])
            .unwrap_err();
        assert!(matches!(err, DomainError::ServiceNotFound { .. }));
    }

    #[test]
    fn malformed_request_fails_before_lookup() {
        let catalog = saas_catalog();
        let bad = ServiceIdentifier::new("", "postgresql");
        let err = DependencyResolver::new(&catalog).resolve(&[bad]).unwrap_err();
        assert!(matches!(err, DomainError::InvalidIdentifier { .. }));
    }

    #[test]
    fn duplicate_requests_merge_tags() {
        let catalog = saas_catalog();
        let graph = DependencyResolver::new(&catalog)
            .resolve(&[
                svc("database:postgresql+multi-tenant"),
                svc("database:postgresql+audited"),
            ])
            .unwrap();
        assert_eq!(graph.order.len(), 1);
        let db = &graph.order[0];
        assert!(db.has_tag("multi-tenant"));
        assert!(db.has_tag("audited"));
        assert!(db.has_tag("rls"));
    }

    #[test]
    fn two_node_cycle_is_reported_in_lexical_start_order() {
        let catalog = catalog(vec![
            template("svc:a").depends_on(pattern("svc:b")).build().unwrap(),
            template("svc:b").depends_on(pattern("svc:a")).build().unwrap(),
        ]);
        let err = DependencyResolver::new(&catalog)
            .resolve(&[svc("svc:a")])
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::CyclicDependency {
                cycle: vec!["svc:a".into(), "svc:b".into()]
            }
        );
    }

    #[test]
    fn three_node_cycle_reports_full_path() {
        let catalog = catalog(vec![
            template("svc:a").depends_on(pattern("svc:b")).build().unwrap(),
            template("svc:b").depends_on(pattern("svc:c")).build().unwrap(),
            template("svc:c").depends_on(pattern("svc:a")).build().unwrap(),
        ]);
        let err = DependencyResolver::new(&catalog)
            .resolve(&[svc("svc:c")])
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::CyclicDependency {
                cycle: vec!["svc:a".into(), "svc:b".into(), "svc:c".into()]
            }
        );
    }

    #[test]
    fn shortest_cycle_wins_over_first_found() {
        let catalog = catalog(vec![
            template("svc:a").depends_on(pattern("svc:b")).build().unwrap(),
            template("svc:b").depends_on(pattern("svc:c")).build().unwrap(),
            template("svc:c")
                .depends_on(pattern("svc:a"))
                .depends_on(pattern("svc:b"))
                .build()
                .unwrap(),
        ]);
        let err = DependencyResolver::new(&catalog)
            .resolve(&[svc("svc:a")])
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::CyclicDependency {
                cycle: vec!["svc:b".into(), "svc:c".into()]
            }
        );
    }

    #[test]
    fn ready_nodes_order_by_priority_then_name() {
        let catalog = saas_catalog();
        let graph = DependencyResolver::new(&catalog)
            .resolve(&[
                svc("auth:better-auth"),
                svc("cache:redis"),
                svc("database:postgresql"),
            ])
            .unwrap();
        // postgresql (100) and redis (90) are ready first; better-auth waits on postgresql
        assert_eq!(
            ids(&graph.order),
            ["database:postgresql", "cache:redis", "auth:better-auth"]
        );
    }

    #[test]
    fn equal_priority_breaks_ties_lexically() {
        let catalog = catalog(vec![
            template("email:resend").build().unwrap(),
            template("analytics:posthog").build().unwrap(),
            template("monitoring:sentry").build().unwrap(),
        ]);
        let graph = DependencyResolver::new(&catalog)
            .resolve(&[
                svc("monitoring:sentry"),
                svc("email:resend"),
                svc("analytics:posthog"),
            ])
            .unwrap();
        assert_eq!(
            ids(&graph.order),
            ["analytics:posthog", "email:resend", "monitoring:sentry"]
        );
    }

    #[test]
    fn self_matching_dependency_is_ignored() {
        let catalog = catalog(vec![
            template("database:postgresql")
                .depends_on(pattern("database:*"))
                .build()
                .unwrap(),
        ]);
        let graph = DependencyResolver::new(&catalog)
            .resolve(&[svc("database:postgresql")])
            .unwrap();
        assert_eq!(ids(&graph.order), ["database:postgresql"]);
        assert_eq!(graph.missing.len(), 1);
    }

    #[test]
    fn declared_conflicts_are_paired_once() {
        let catalog = catalog(vec![
            template("auth:clerk")
                .conflicts_with(pattern("auth:better-auth"))
                .build()
                .unwrap(),
            template("auth:better-auth")
                .conflicts_with(pattern("auth:clerk"))
                .build()
                .unwrap(),
        ]);
        let graph = DependencyResolver::new(&catalog)
            .resolve(&[svc("auth:clerk"), svc("auth:better-auth")])
            .unwrap();
        assert_eq!(graph.conflicts.len(), 1);
    }

    #[test]
    fn edges_point_from_dependency_to_dependent() {
        let catalog = saas_catalog();
        let graph = DependencyResolver::new(&catalog)
            .resolve(&[svc("auth:better-auth"), svc("payment:stripe")])
            .unwrap();
        for (dep, dependent) in &graph.edges {
            let d = graph.order.iter().position(|s| s == dep).unwrap();
            let s = graph.order.iter().position(|s| s == dependent).unwrap();
            assert!(d < s, "{dep} must precede {dependent}");
        }
        assert_eq!(graph.edges.len(), 2);
    }
}
