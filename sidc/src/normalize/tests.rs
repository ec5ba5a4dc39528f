use test_strategy::proptest;

use super::super::generation::Generation;
use super::{basic_code, full_code_from_basic, normalize, reduce_from, validate};

#[test]
fn test_2525c_unit_is_masked() {
    assert_eq!(normalize("SFGPUCI-------G", Generation::C), "SFGPUCI---*****");
    assert_eq!(normalize("sfgpuci-------g", Generation::C), "SFGPUCI---*****");
}

#[test]
fn test_2525c_installation_keeps_its_marker() {
    assert_eq!(normalize("SFGPIRP---H----", Generation::C), "SFGPIRP---H****");
}

#[test]
fn test_2525c_masking_by_coding_scheme() {
    assert_eq!(normalize("GFGPGLF---AAUSX", Generation::C), "GFGPGLF---****X");
    assert_eq!(normalize("IFGPSCC----USAA", Generation::C), "IFGPSCC----U***");
    assert_eq!(normalize("OFGPVA----AAUSX", Generation::C), "OFGPVA----*****");
    assert_eq!(normalize("EFOPAB----H----", Generation::C), "EFOPAB----H****");
    // Weather codes are not masked.
    assert_eq!(normalize("WAS-PL----P----", Generation::C), "WAS-PL----P----");
}

#[test]
fn test_2525c_short_and_long_codes() {
    assert_eq!(normalize("SFGPUCI", Generation::C), "SFGPUCI---*****");
    assert_eq!(normalize("SFGPUCI-------GXYZ", Generation::C), "SFGPUCI---*****");
    assert_eq!(normalize("", Generation::C), "---------------");
}

#[test]
fn test_2525d_version_remapping() {
    assert_eq!(
        normalize("11031000001211000000", Generation::D),
        "10031000001211000000"
    );
    assert_eq!(
        normalize("130310000012110000000000000000", Generation::D),
        "10031000001211000000"
    );
    assert_eq!(normalize("1003", Generation::D), "10030000000000000000");
}

#[test]
fn test_2525e_keeps_its_version() {
    assert_eq!(
        normalize("13031000001211000000", Generation::E),
        "130310000012110000000000000000"
    );
}

#[test]
fn test_basic_code() {
    assert_eq!(basic_code("SFGPUCI-------G", Generation::C), "S*G*UCI---*****");
    assert_eq!(basic_code("WAS-PL----P----", Generation::C), "WAS-PL----P----");
    assert_eq!(basic_code("10031000161211000000", Generation::D), "10121100");
    assert_eq!(
        basic_code("130325000014010000000000000000", Generation::E),
        "25140100"
    );
}

#[test]
fn test_full_code_from_basic() {
    assert_eq!(
        full_code_from_basic("10121100", Generation::D),
        "10001000001211000000"
    );
    assert_eq!(
        full_code_from_basic("25140100", Generation::E),
        "130025000014010000000000000000"
    );
}

#[test]
fn test_reduce_from() {
    assert_eq!(
        reduce_from("10031000001211010203", 16),
        "10031000001211010000"
    );
    assert_eq!(
        reduce_from("10031000001211010203", 10),
        "10031000000000000000"
    );
}

#[test]
fn test_validate() {
    assert!(validate("SFGPUCI-------G").is_ok());
    assert!(validate("SFGPUCI").is_err());
}

#[proptest]
fn normalize_is_idempotent(code: String, generation: Generation) {
    let once = normalize(&code, generation);
    assert_eq!(normalize(&once, generation), once);
}

#[proptest]
fn normalize_produces_canonical_length(code: String, generation: Generation) {
    assert_eq!(
        normalize(&code, generation).chars().count(),
        generation.canonical_len()
    );
}
