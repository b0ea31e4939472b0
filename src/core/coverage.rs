use super::model::{CoverageBreakdown, CoverageReport, SourceUnit};

/// Documentation coverage of an entity forest.
///
/// The module is counted only when it carries a documentation string, so it
/// can never lower the percentage. A forest with nothing to count reports
/// 100%.
pub struct CoverageCalculator;

impl CoverageCalculator {
    pub fn calculate(unit: &SourceUnit) -> CoverageReport {
        let mut breakdown = CoverageBreakdown::default();

        for class in &unit.classes {
            breakdown.classes.record(class.documented);
            for method in &class.methods {
                breakdown.methods.record(method.documented);
            }
        }
        for function in &unit.functions {
            breakdown.functions.record(function.documented);
        }

        let module = usize::from(unit.module_docstring.is_some());
        let documented = module
            + breakdown.classes.documented
            + breakdown.functions.documented
            + breakdown.methods.documented;
        let total = module + breakdown.classes.total + breakdown.functions.total + breakdown.methods.total;

        CoverageReport {
            documented,
            total,
            percentage: percentage(documented, total),
            breakdown,
        }
    }
}

fn percentage(documented: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (documented as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{ClassEntity, FunctionEntity, FunctionKind};

    fn function(name: &str, kind: FunctionKind, documented: bool) -> FunctionEntity {
        FunctionEntity {
            name: name.to_string(),
            kind,
            start_line: 1,
            end_line: 2,
            parameters: Vec::new(),
            return_annotation: None,
            decorators: Vec::new(),
            is_async: false,
            documented,
            docstring: documented.then(|| "Docs.".to_string()),
            generated_docstring: None,
        }
    }

    fn class(name: &str, documented: bool, methods: Vec<FunctionEntity>) -> ClassEntity {
        ClassEntity {
            name: name.to_string(),
            bases: Vec::new(),
            decorators: Vec::new(),
            start_line: 1,
            end_line: 10,
            documented,
            docstring: documented.then(|| "Docs.".to_string()),
            generated_docstring: None,
            methods,
        }
    }

    fn unit(module_docstring: Option<&str>, classes: Vec<ClassEntity>, functions: Vec<FunctionEntity>) -> SourceUnit {
        SourceUnit {
            file_name: "test.py".to_string(),
            text: String::new(),
            module_docstring: module_docstring.map(str::to_string),
            classes,
            functions,
        }
    }

    #[test]
    fn test_empty_unit_is_fully_covered() {
        let report = CoverageCalculator::calculate(&unit(None, vec![], vec![]));
        assert_eq!(report.total, 0);
        assert_eq!(report.documented, 0);
        assert_eq!(report.percentage, 100.0);
    }

    #[test]
    fn test_undocumented_class_and_method() {
        let forest = unit(None, vec![class("Greeter", false, vec![function("greet", FunctionKind::Method, false)])], vec![]);
        let report = CoverageCalculator::calculate(&forest);
        assert_eq!(report.total, 2);
        assert_eq!(report.documented, 0);
        assert_eq!(report.percentage, 0.0);
        assert_eq!(report.breakdown.methods.total, 1);
    }

    #[test]
    fn test_module_docstring_counts_as_entity() {
        let forest = unit(
            Some("Module."),
            vec![class("A", true, vec![])],
            vec![function("f", FunctionKind::Function, false), function("g", FunctionKind::Function, true)],
        );
        let report = CoverageCalculator::calculate(&forest);
        assert_eq!(report.total, 4);
        assert_eq!(report.documented, 3);
        assert_eq!(report.percentage, 75.0);
        assert_eq!(report.breakdown.functions.documented, 1);
        assert_eq!(report.breakdown.functions.total, 2);
    }

    #[test]
    fn test_percentage_grows_with_documented_entities() {
        let mut previous = -1.0;
        for documented in 0..=4 {
            let functions = (0..4)
                .map(|i| function(&format!("f{}", i), FunctionKind::Function, i < documented))
                .collect();
            let report = CoverageCalculator::calculate(&unit(None, vec![], functions));
            assert!(report.percentage >= previous);
            assert!((0.0..=100.0).contains(&report.percentage));
            previous = report.percentage;
        }
        assert_eq!(previous, 100.0);
    }
}
