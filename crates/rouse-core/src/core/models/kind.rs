use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Observable recorded by a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataKind {
    /// Squared end-to-end distance, one scalar per sample.
    R2,
    /// End-to-end vector, three components per sample.
    EndToEndVector,
}

struct KindInfo {
    kind: DataKind,
    name: &'static str,
    file_name: &'static str,
    description: &'static str,
}

static KIND_TABLE: [KindInfo; 2] = [
    KindInfo {
        kind: DataKind::R2,
        name: "r2",
        file_name: "r2.dat",
        description: "squared end-to-end distance",
    },
    KindInfo {
        kind: DataKind::EndToEndVector,
        name: "end-to-end-vector",
        file_name: "r_end_vec.dat",
        description: "end-to-end vector",
    },
];

impl DataKind {
    pub const ALL: [DataKind; 2] = [DataKind::R2, DataKind::EndToEndVector];

    fn info(self) -> &'static KindInfo {
        // Every variant has exactly one row.
        match self {
            DataKind::R2 => &KIND_TABLE[0],
            DataKind::EndToEndVector => &KIND_TABLE[1],
        }
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// File name the simulation writes this observable to inside a run directory.
    pub fn file_name(self) -> &'static str {
        self.info().file_name
    }

    pub fn description(self) -> &'static str {
        self.info().description
    }

    pub fn is_vector(self) -> bool {
        matches!(self, DataKind::EndToEndVector)
    }

    pub fn from_file_name(file_name: &str) -> Option<Self> {
        KIND_TABLE
            .iter()
            .find(|info| info.file_name == file_name)
            .map(|info| info.kind)
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KIND_TABLE
            .iter()
            .find(|info| info.name.eq_ignore_ascii_case(s) || info.file_name == s)
            .map(|info| info.kind)
            .ok_or_else(|| {
                let known: Vec<_> = KIND_TABLE.iter().map(|info| info.name).collect();
                format!("unknown data kind '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_table_covers_every_kind() {
        for kind in DataKind::ALL {
            assert_eq!(kind.info().kind, kind);
            assert_eq!(DataKind::from_file_name(kind.file_name()), Some(kind));
        }
    }

    #[test]
    fn canonical_file_names() {
        assert_eq!(DataKind::R2.file_name(), "r2.dat");
        assert_eq!(DataKind::EndToEndVector.file_name(), "r_end_vec.dat");
        assert_eq!(DataKind::from_file_name("other.dat"), None);
    }

    #[test]
    fn parses_names_and_file_names() {
        assert_eq!("r2".parse::<DataKind>(), Ok(DataKind::R2));
        assert_eq!(
            "End-To-End-Vector".parse::<DataKind>(),
            Ok(DataKind::EndToEndVector)
        );
        assert_eq!("r_end_vec.dat".parse::<DataKind>(), Ok(DataKind::EndToEndVector));
        assert!("velocity".parse::<DataKind>().is_err());
    }

    #[test]
    fn deserializes_from_kebab_case() {
        use serde::de::IntoDeserializer;
        use serde::de::value::Error as ValueError;

        let de: serde::de::value::StrDeserializer<'_, ValueError> =
            "end-to-end-vector".into_deserializer();
        assert_eq!(DataKind::deserialize(de), Ok(DataKind::EndToEndVector));
    }
}
