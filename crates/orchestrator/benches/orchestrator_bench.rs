use common::{OrderId, PartId, UserId};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{Money, Part};
use orchestrator::{
    InMemoryCatalog, InMemoryPaymentClient, OrchestratorConfig, OrderLocks, OrderOrchestrator,
};
use order_store::InMemoryOrderRepository;

type BenchOrchestrator =
    OrderOrchestrator<InMemoryOrderRepository, InMemoryCatalog, InMemoryPaymentClient>;

fn setup(part_count: usize) -> (BenchOrchestrator, Vec<PartId>) {
    let parts: Vec<Part> = (0..part_count)
        .map(|i| {
            Part::new(
                PartId::new(),
                format!("Part {i}"),
                Money::from_cents(1_000 + i as i64),
                "HULL",
            )
        })
        .collect();
    let part_ids = parts.iter().map(|p| p.id).collect();

    let orchestrator = OrderOrchestrator::new(
        InMemoryOrderRepository::new(),
        InMemoryCatalog::with_parts(parts),
        InMemoryPaymentClient::new(),
        OrchestratorConfig::default(),
    );
    (orchestrator, part_ids)
}

fn bench_create_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (orchestrator, part_ids) = setup(10);

    c.bench_function("orchestrator/create_order_10_parts", |b| {
        b.iter(|| {
            rt.block_on(async {
                orchestrator
                    .create_order(UserId::new(), part_ids.clone())
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_create_and_pay(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (orchestrator, part_ids) = setup(3);

    c.bench_function("orchestrator/create_and_pay", |b| {
        b.iter(|| {
            rt.block_on(async {
                let order = orchestrator
                    .create_order(UserId::new(), part_ids.clone())
                    .await
                    .unwrap();
                orchestrator.pay_order(order.id(), "CARD").await.unwrap();
            });
        });
    });
}

fn bench_get_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (orchestrator, part_ids) = setup(3);
    let order = rt.block_on(async {
        orchestrator
            .create_order(UserId::new(), part_ids)
            .await
            .unwrap()
    });

    c.bench_function("orchestrator/get_order", |b| {
        b.iter(|| {
            rt.block_on(async {
                orchestrator.get_order(order.id()).await.unwrap();
            });
        });
    });
}

fn bench_order_lock(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let locks = OrderLocks::new();

    c.bench_function("orchestrator/acquire_release_lock", |b| {
        b.iter(|| {
            rt.block_on(async {
                let _guard = locks.acquire(OrderId::new()).await;
            });
        });
    });
}

criterion_group!(
    benches,
    bench_create_order,
    bench_create_and_pay,
    bench_get_order,
    bench_order_lock,
);
criterion_main!(benches);
