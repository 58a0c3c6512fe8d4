use serde::{de::DeserializeOwned, Serialize};
use std::hash::Hash;

/// Трейт для типов идентификаторов агрегатов
///
/// Все агрегаты хранятся с целочисленным автоинкрементным ключом,
/// значение `0` означает "ещё не сохранён".
pub trait AggregateId:
    Clone + Copy + PartialEq + Eq + Hash + Serialize + DeserializeOwned + std::fmt::Debug
{
    /// Сырое значение первичного ключа
    fn value(&self) -> i64;

    /// Создать ID из сырого значения
    fn from_value(value: i64) -> Self;

    /// Преобразовать ID в строку
    fn as_string(&self) -> String {
        self.value().to_string()
    }

    /// Создать ID из строки (например, из сегмента URL)
    fn from_string(s: &str) -> Result<Self, String> {
        s.trim()
            .parse::<i64>()
            .map(Self::from_value)
            .map_err(|e| format!("Invalid id '{}': {}", s, e))
    }

    /// Запись ещё не сохранена в БД
    fn is_new(&self) -> bool {
        self.value() == 0
    }
}

/// Объявляет newtype-идентификатор агрегата поверх `i64`
#[macro_export]
macro_rules! aggregate_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            /// Идентификатор ещё не сохранённой записи
            pub fn unsaved() -> Self {
                Self(0)
            }
        }

        impl $crate::domain::common::AggregateId for $name {
            fn value(&self) -> i64 {
                self.0
            }

            fn from_value(value: i64) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::AggregateId;

    crate::aggregate_id!(SampleId);

    #[test]
    fn test_from_string() {
        assert_eq!(SampleId::from_string(" 42 ").unwrap(), SampleId(42));
        assert!(SampleId::from_string("abc").is_err());
    }

    #[test]
    fn test_is_new() {
        assert!(SampleId::unsaved().is_new());
        assert!(!SampleId::new(7).is_new());
        assert_eq!(SampleId::new(7).as_string(), "7");
    }
}
