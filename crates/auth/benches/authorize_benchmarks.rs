use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use tripbook_auth::{authorize, OrgContext, Permission, Principal, Role, RoleRegistry};
use tripbook_core::{OrganizationId, UserId};

fn principal(roles: Vec<Role>, is_organization_admin: bool, is_superuser: bool) -> Principal {
    Principal {
        user_id: UserId::new(),
        organization: Some(OrgContext {
            id: OrganizationId::new(),
            active: true,
        }),
        roles,
        is_organization_admin,
        is_superuser,
    }
}

fn bench_decision_paths(c: &mut Criterion) {
    let registry = RoleRegistry::builtin();
    let mut group = c.benchmark_group("authorize_decision_paths");
    group.sample_size(1000);

    group.bench_function("superuser_allow", |b| {
        let p = principal(vec![], false, true);
        b.iter(|| authorize(black_box(&p), black_box(Permission::ManageVehicles), &registry));
    });

    group.bench_function("admin_flag_allow", |b| {
        let p = principal(vec![], true, false);
        b.iter(|| {
            authorize(
                black_box(&p),
                black_box(Permission::ManageOrganizationUsers),
                &registry,
            )
        });
    });

    group.bench_function("role_union_allow", |b| {
        let p = principal(vec![Role::DRIVERS, Role::ACCOUNTANTS], false, false);
        b.iter(|| authorize(black_box(&p), black_box(Permission::ApproveTrips), &registry));
    });

    group.bench_function("permission_denied", |b| {
        let p = principal(vec![Role::USERS], false, false);
        b.iter(|| {
            authorize(
                black_box(&p),
                black_box(Permission::ManageSystemSettings),
                &registry,
            )
        });
    });

    group.finish();
}

fn bench_effective_permissions(c: &mut Criterion) {
    let registry = RoleRegistry::builtin();
    let stock = [
        Role::ADMINISTRATORS,
        Role::ACCOUNTANTS,
        Role::DRIVERS,
        Role::USERS,
    ];

    let mut group = c.benchmark_group("effective_permissions_union");
    for role_count in [1usize, 2, 4].iter() {
        group.throughput(Throughput::Elements(*role_count as u64));
        group.bench_with_input(
            BenchmarkId::new("union_over_roles", role_count),
            role_count,
            |b, &count| {
                let roles: Vec<Role> = stock[..count].to_vec();
                b.iter(|| registry.effective_permissions(black_box(&roles)));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_decision_paths, bench_effective_permissions);
criterion_main!(benches);
