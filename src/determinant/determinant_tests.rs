use std::collections::HashSet;

use itertools::Itertools;

use crate::determinant::{check_nbasis, nword, Determinant, MAX_NBASIS, MAX_NWORD};
use crate::error::DociErrorKind;

#[test]
fn test_determinant_from_occs() {
    let det = Determinant::from_occs(6, &[4, 0, 2]).unwrap();
    assert_eq!(det.nbasis(), 6);
    assert_eq!(det.popcount(), 3);
    assert_eq!(det.occs(), vec![0, 2, 4]);
    assert_eq!(det.virs(), vec![1, 3, 5]);
    assert!(det.is_occupied(2));
    assert!(!det.is_occupied(3));
    assert!(!det.is_occupied(100));
    assert_eq!(det.words(), vec![0b010101]);
    assert_eq!(det.to_string(), "|202020⟩");

    assert_eq!(
        Determinant::from_occs(6, &[0, 6]).unwrap_err().kind(),
        DociErrorKind::InvalidArgument
    );
    assert_eq!(
        Determinant::from_occs(6, &[1, 1]).unwrap_err().kind(),
        DociErrorKind::InvalidArgument
    );
}

#[test]
fn test_determinant_words_multiword() {
    assert_eq!(nword(1), 1);
    assert_eq!(nword(64), 1);
    assert_eq!(nword(65), 2);
    assert_eq!(nword(129), 3);

    let det = Determinant::from_occs(129, &[0, 63, 64, 128]).unwrap();
    let words = det.words();
    assert_eq!(words, vec![1 | (1 << 63), 1, 1]);
    let det2 = Determinant::from_words(129, &words).unwrap();
    assert_eq!(det, det2);
    assert_eq!(det2.occs(), vec![0, 63, 64, 128]);

    let full = Determinant::from_occs(64, &(0..64).collect_vec()).unwrap();
    assert_eq!(full.words(), vec![u64::MAX]);
}

#[test]
fn test_determinant_from_words_validation() {
    assert_eq!(
        Determinant::from_words(65, &[1]).unwrap_err().kind(),
        DociErrorKind::InvalidArgument
    );
    // Bit 5 lies beyond a 5-orbital determinant.
    assert_eq!(
        Determinant::from_words(5, &[0b100001]).unwrap_err().kind(),
        DociErrorKind::InvalidArgument
    );
    assert_eq!(
        Determinant::from_words(66, &[0, 0b100]).unwrap_err().kind(),
        DociErrorKind::InvalidArgument
    );
    assert!(Determinant::from_words(66, &[0, 0b10]).is_ok());
}

#[test]
fn test_determinant_width_limit() {
    assert_eq!(nword(MAX_NBASIS), MAX_NWORD);
    assert!(check_nbasis(MAX_NBASIS).is_ok());
    assert_eq!(
        check_nbasis(MAX_NBASIS + 1).unwrap_err().kind(),
        DociErrorKind::ResourceExceeded
    );
    assert_eq!(
        Determinant::from_occs(usize::MAX, &[0]).unwrap_err().kind(),
        DociErrorKind::ResourceExceeded
    );
    assert_eq!(
        Determinant::from_occs(1 << 40, &[0]).unwrap_err().kind(),
        DociErrorKind::ResourceExceeded
    );
    assert_eq!(
        Determinant::from_words(usize::MAX, &[1]).unwrap_err().kind(),
        DociErrorKind::ResourceExceeded
    );
}

#[test]
fn test_determinant_equality_and_hash_by_content() {
    let det_a = Determinant::from_occs(10, &[1, 3, 5]).unwrap();
    let det_b = Determinant::from_occs(10, &[5, 3, 1]).unwrap();
    let det_c = Determinant::from_words(10, &[0b101010]).unwrap();
    assert_eq!(det_a, det_b);
    assert_eq!(det_a, det_c);
    let set = [det_a, det_b, det_c].into_iter().collect::<HashSet<_>>();
    assert_eq!(set.len(), 1);

    let det_d = Determinant::from_occs(11, &[1, 3, 5]).unwrap();
    assert!(!set.contains(&det_d));
}

#[test]
fn test_determinant_rank() {
    let nbasis = 7;
    for (rank, occs) in (0..nbasis).combinations(3).enumerate() {
        let det = Determinant::from_occs(nbasis, &occs).unwrap();
        assert_eq!(det.rank().unwrap(), rank as u64);
    }
}

#[test]
fn test_determinant_excite() {
    let det = Determinant::from_occs(5, &[0, 1]).unwrap();
    let ex = det.excite(1, 3).unwrap();
    assert_eq!(ex.occs(), vec![0, 3]);
    assert_eq!(det.occs(), vec![0, 1]);
    assert_eq!(ex.excitation_level(&det), Some(1));
    assert_eq!(det.excitation_level(&det), Some(0));

    assert_eq!(
        det.excite(2, 3).unwrap_err().kind(),
        DociErrorKind::InvalidArgument
    );
    assert_eq!(
        det.excite(0, 1).unwrap_err().kind(),
        DociErrorKind::InvalidArgument
    );
    assert_eq!(
        det.excite(0, 5).unwrap_err().kind(),
        DociErrorKind::InvalidArgument
    );

    let other = Determinant::from_occs(5, &[0, 1, 2]).unwrap();
    assert_eq!(det.excitation_level(&other), None);
}

#[test]
fn test_determinant_pair_excitations() {
    let det = Determinant::from_occs(5, &[0, 2]).unwrap();
    let singles = det.pair_excitations();
    let singles_occs = singles.iter().map(|d| d.occs()).collect_vec();
    assert_eq!(
        singles_occs,
        vec![
            vec![1, 2],
            vec![2, 3],
            vec![2, 4],
            vec![0, 1],
            vec![0, 3],
            vec![0, 4],
        ]
    );
    assert!(singles
        .iter()
        .all(|d| d.popcount() == 2 && d.excitation_level(&det) == Some(1)));
}
