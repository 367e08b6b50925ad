use essence_armory::armory::{
    ArmoryError, CurrencyLedger, GrantReceipt, Holdings, ItemStack, Material, Provenance,
    StackLedger, PROVENANCE_SCHEMA_VERSION,
};
use essence_armory::config::EssenceConfig;

fn ledger() -> StackLedger {
    StackLedger::new(EssenceConfig::default())
}

#[test]
fn grant_from_zero_then_balance_is_exact() {
    let ledger = ledger();
    let mut holdings = Holdings::with_capacity(36);
    assert_eq!(ledger.balance(&holdings), 0);
    ledger.grant(&mut holdings, 37).unwrap();
    assert_eq!(ledger.balance(&holdings), 37);
}

#[test]
fn granted_stacks_carry_versioned_provenance() {
    let ledger = ledger();
    let mut holdings = Holdings::with_capacity(4);
    ledger.grant(&mut holdings, 5).unwrap();

    let stack = holdings.inventory()[0].as_ref().unwrap();
    assert_eq!(stack.material, Material::NetherStar);
    let tag = stack.provenance.as_ref().unwrap();
    assert_eq!(tag.schema_version, PROVENANCE_SCHEMA_VERSION);
    assert_eq!(tag.provenance, Provenance::Essence);
    assert!(StackLedger::is_essence(stack));
}

#[test]
fn balance_sums_every_stack_and_ignores_other_items() {
    let ledger = ledger();
    let mut holdings = Holdings::with_capacity(10);
    holdings
        .add_item(ItemStack::new(Material::Other("diamond".into()), "Diamond", 64))
        .unwrap();
    ledger.grant(&mut holdings, 200).unwrap();
    holdings
        .add_item(ItemStack::new(Material::NetherStar, "Nether Star", 3))
        .unwrap();

    assert_eq!(ledger.balance(&holdings), 200);
}

#[test]
fn grant_reports_partial_placement_when_full() {
    let ledger = ledger();
    let mut holdings = Holdings::with_capacity(1);
    let receipt = ledger.grant(&mut holdings, 100).unwrap();
    assert_eq!(
        receipt,
        GrantReceipt {
            requested: 100,
            placed: 64
        }
    );
    assert!(receipt.is_partial());
    assert_eq!(ledger.balance(&holdings), 64);
}

#[test]
fn zero_grant_is_invalid() {
    let ledger = ledger();
    let mut holdings = Holdings::with_capacity(1);
    assert!(matches!(
        ledger.grant(&mut holdings, 0),
        Err(ArmoryError::InvalidAmount(0))
    ));
    assert_eq!(ledger.balance(&holdings), 0);
}

#[test]
fn deduct_leaves_no_empty_stacks() {
    let ledger = ledger();
    let mut holdings = Holdings::with_capacity(36);
    ledger.grant(&mut holdings, 130).unwrap();

    ledger.deduct(&mut holdings, 64).unwrap();
    assert_eq!(ledger.balance(&holdings), 66);
    assert!(holdings
        .inventory()
        .iter()
        .flatten()
        .all(|stack| stack.quantity > 0));

    ledger.deduct(&mut holdings, 66).unwrap();
    assert_eq!(ledger.balance(&holdings), 0);
    assert_eq!(holdings.free_slots(), 36);
}

#[test]
fn deduct_zero_is_a_no_op() {
    let ledger = ledger();
    let mut holdings = Holdings::with_capacity(4);
    ledger.grant(&mut holdings, 10).unwrap();
    let before = holdings.clone();
    ledger.deduct(&mut holdings, 0).unwrap();
    assert_eq!(holdings, before);
}

#[test]
fn custom_stack_size_is_respected() {
    let ledger = StackLedger::new(EssenceConfig {
        max_stack_size: 16,
        ..EssenceConfig::default()
    });
    let mut holdings = Holdings::with_capacity(36);
    ledger.grant(&mut holdings, 40).unwrap();

    let sizes: Vec<u32> = holdings
        .inventory()
        .iter()
        .flatten()
        .map(|s| s.quantity)
        .collect();
    assert_eq!(sizes, vec![16, 16, 8]);
}
