/// Bijective mapping between class names and dense indices, in alphabetical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn encode(&self, label: &str) -> anyhow::Result<i64> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .map(|index| index as i64)
            .map_err(|_| anyhow::anyhow!("Unknown label: {label}"))
    }

    pub fn decode(&self, index: i64) -> anyhow::Result<&str> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.classes.get(i))
            .map(String::as_str)
            .ok_or_else(|| anyhow::anyhow!("Unknown label index: {index}"))
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CLASS_NAMES;

    #[test]
    fn test_alphabetical_indices() {
        let sut = LabelEncoder::fit(["Dog", "Cat", "Bear"]);
        assert_eq!(0, sut.encode("Bear").unwrap());
        assert_eq!(1, sut.encode("Cat").unwrap());
        assert_eq!(2, sut.encode("Dog").unwrap());
    }

    #[test]
    fn test_round_trip() {
        let sut = LabelEncoder::fit(CLASS_NAMES);
        assert_eq!(8, sut.len());
        for name in CLASS_NAMES {
            assert_eq!(name, sut.decode(sut.encode(name).unwrap()).unwrap());
        }
    }

    #[test]
    fn test_duplicates_collapse() {
        let sut = LabelEncoder::fit(["Cow", "Cow", "Bear"]);
        assert_eq!(&["Bear".to_owned(), "Cow".to_owned()], sut.classes());
    }

    #[test]
    fn test_unknown_label() {
        let sut = LabelEncoder::fit(CLASS_NAMES);
        let err = sut.encode("Unicorn").unwrap_err();
        assert!(err.to_string().contains("Unknown label"));
    }

    #[test]
    fn test_out_of_range_index() {
        let sut = LabelEncoder::fit(CLASS_NAMES);
        assert!(sut.decode(8).is_err());
        assert!(sut.decode(-1).is_err());
    }
}
