/// Human label for an ascendancy number. Only the first three generations are named.
pub fn label_relationship(ascendancy_number: &str) -> &'static str {
    match ascendancy_number {
        "1" => "Self",
        "2" => "Father",
        "3" => "Mother",
        "4" => "Paternal Grandfather",
        "5" => "Paternal Grandmother",
        "6" => "Maternal Grandfather",
        "7" => "Maternal Grandmother",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(label_relationship("1"), "Self");
        assert_eq!(label_relationship("2"), "Father");
        assert_eq!(label_relationship("5"), "Paternal Grandmother");
        assert_eq!(label_relationship("7"), "Maternal Grandmother");
    }

    #[test]
    fn beyond_grandparents_is_unknown() {
        assert_eq!(label_relationship("8"), "Unknown");
        assert_eq!(label_relationship("255"), "Unknown");
        assert_eq!(label_relationship(""), "Unknown");
        assert_eq!(label_relationship(" 1"), "Unknown");
    }
}
