use tempfile::tempdir;

use crate::drivers::enumeration::{DeterminantEnumerationDriver, DeterminantEnumerationParams};
use crate::drivers::DociDriver;
use crate::io::{read_doci_yaml, write_doci_yaml, DociFileType};
use crate::store::{DeterminantStore, DeterminantStoreParams};

#[test]
fn test_drivers_enumeration_full_space() {
    let params = DeterminantEnumerationParams::builder()
        .nbasis(10)
        .nocc(3)
        .reserve(Some(50))
        .build()
        .unwrap();
    let mut driver = DeterminantEnumerationDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    assert!(driver.result().is_err());
    driver.run().unwrap();

    let res = driver.result().unwrap();
    assert_eq!(res.additions, vec![(None, 120)]);
    assert_eq!(res.store.count(), 120);
    assert!(res.saved_path.is_none());
    assert!(res.to_string().contains("full space"));
}

#[test]
fn test_drivers_enumeration_excitation_orders() {
    let params = DeterminantEnumerationParams::builder()
        .nbasis(8)
        .nocc(2)
        .excitation_orders(Some(vec![0, 2, 1, 2]))
        .build()
        .unwrap();
    let mut driver = DeterminantEnumerationDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    driver.run().unwrap();

    let res = driver.result().unwrap();
    assert_eq!(
        res.additions,
        vec![(Some(0), 1), (Some(2), 15), (Some(1), 12), (Some(2), 0)]
    );
    let store = res.clone().into_store();
    assert_eq!(store.count(), 28);
    assert_eq!(store.get(0), Some(store.reference()));
}

#[test]
fn test_drivers_enumeration_errors() {
    assert!(DeterminantEnumerationParams::builder()
        .nbasis(8)
        .nocc(2)
        .excitation_orders(Some(vec![]))
        .build()
        .is_err());
    assert!(DeterminantEnumerationParams::builder()
        .nbasis(8)
        .build()
        .is_err());

    let params = DeterminantEnumerationParams::builder()
        .nbasis(8)
        .nocc(2)
        .excitation_orders(Some(vec![1, 3]))
        .build()
        .unwrap();
    let mut driver = DeterminantEnumerationDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    assert!(driver.run().is_err());
    assert!(driver.result().is_err());

    let params = DeterminantEnumerationParams::builder()
        .nbasis(8)
        .nocc(8)
        .build()
        .unwrap();
    let mut driver = DeterminantEnumerationDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    assert!(driver.run().is_err());

    let params = DeterminantEnumerationParams::builder()
        .nbasis(16)
        .nocc(8)
        .store_params(
            DeterminantStoreParams::builder()
                .max_determinants(100)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let mut driver = DeterminantEnumerationDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    assert!(driver.run().is_err());
}

#[test]
fn test_drivers_enumeration_save() {
    let dir = tempdir().unwrap();
    let name = dir.path().join("h4_sto3g");
    let params = DeterminantEnumerationParams::builder()
        .nbasis(8)
        .nocc(2)
        .excitation_orders(Some(vec![0, 1]))
        .result_save_name(Some(name.clone()))
        .build()
        .unwrap();
    let mut driver = DeterminantEnumerationDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    driver.run().unwrap();

    let res = driver.result().unwrap();
    let path = DociFileType::Wfn.path_for(&name);
    assert_eq!(res.saved_path.as_ref(), Some(&path));
    let read = DeterminantStore::from_file(&path).unwrap();
    assert_eq!(read.count(), res.store.count());
    assert!(read
        .iter()
        .zip(res.store.iter())
        .all(|((_, det_a), (_, det_b))| det_a == det_b));
}

#[test]
fn test_drivers_enumeration_params_yaml() {
    let dir = tempdir().unwrap();
    let name = dir.path().join("enumeration");
    let params = DeterminantEnumerationParams::builder()
        .nbasis(12)
        .nocc(4)
        .excitation_orders(Some(vec![0, 1, 2]))
        .reserve(Some(1000))
        .build()
        .unwrap();
    write_doci_yaml(&name, &params).unwrap();
    let read: DeterminantEnumerationParams = read_doci_yaml(name.with_extension("yml")).unwrap();
    assert_eq!(read, params);

    let minimal = dir.path().join("minimal.yml");
    std::fs::write(&minimal, "nbasis: 6\nnocc: 3\n").unwrap();
    let read: DeterminantEnumerationParams = read_doci_yaml(&minimal).unwrap();
    assert_eq!(read.excitation_orders, None);
    assert_eq!(read.store_params, DeterminantStoreParams::default());
}
