use super::SystemContext;
use crate::environment::{native::lookup_builtin, Environment};
use crate::parser::{
    expression::{ConditionalBranch, Expression, HashKey, InfixOperator, PrefixOperator},
    statement::{BlockStatement, Statement},
    Program,
};
use crate::value::{
    error::{RuntimeError, RuntimeErrorKind},
    BoundIdentifier, Element, ElementKey, Function, Value,
};
use compact_str::CompactString;
use std::collections::HashMap;
use std::rc::Rc;

/// Evaluates whole programs against an environment that outlives each run, so that a
/// shell can feed it one line at a time.
pub struct TreeWalkInterpreter<C: SystemContext> {
    environment: Environment,
    context: C,
    interpreter: TreeWalkStatementInterpreter,
}

impl<C> TreeWalkInterpreter<C>
where
    C: SystemContext,
{
    pub fn new(environment: Environment, context: C) -> Self {
        Self {
            environment,
            context,
            interpreter: TreeWalkStatementInterpreter::create(),
        }
    }

    pub fn get_environment(&self) -> &Environment {
        &self.environment
    }

    pub fn get_context(&self) -> &C {
        &self.context
    }

    /// Runs the statements in order. A `return` or an error ends the run early and becomes
    /// the result. Otherwise the result is the value of the last statement.
    pub fn evaluate_program(&mut self, program: &Program) -> Value {
        tracing::debug!(statements = program.len(), "evaluating program");
        let mut result = Value::Null;
        for statement in program {
            match self
                .interpreter
                .interpret_statement(&self.environment, &mut self.context, statement)
            {
                Ok(Value::Return(value)) => return (*value).resolve(),
                Ok(value) => result = value.resolve(),
                Err(error) => {
                    tracing::debug!(code = error.code(), "{error}");
                    return Value::Error(error);
                }
            }
        }
        result
    }
}

pub struct TreeWalkStatementInterpreter;

impl TreeWalkStatementInterpreter {
    fn create() -> Self {
        Self {}
    }

    pub fn interpret_statement<C: SystemContext>(
        &self,
        environment: &Environment,
        context: &mut C,
        statement: &Statement,
    ) -> Result<Value, RuntimeError> {
        match statement {
            Statement::Let { name, value } => {
                let value = self.evaluate(environment, context, value)?.resolve();
                if matches!(value, Value::Return(_)) {
                    return Ok(value);
                }
                environment.declare(name, value);
                Ok(Value::Null)
            }
            Statement::Return { value } => {
                let value = self.evaluate(environment, context, value)?.resolve();
                match value {
                    Value::Return(_) => Ok(value),
                    value => Ok(Value::Return(Box::new(value))),
                }
            }
            Statement::Expression(expression) => self.evaluate(environment, context, expression),
        }
    }

    /// Runs the statements in a fresh child scope, stopping at the first `return`.
    pub fn interpret_block<C: SystemContext>(
        &self,
        environment: &Environment,
        context: &mut C,
        block: &BlockStatement,
    ) -> Result<Value, RuntimeError> {
        let scope = environment.new_scope();
        let mut result = Value::Null;
        for statement in block.iter() {
            result = self.interpret_statement(&scope, context, statement)?;
            if matches!(result, Value::Return(_)) {
                return Ok(result);
            }
        }
        Ok(result.resolve())
    }
}

// Expression evaluation
impl TreeWalkStatementInterpreter {
    pub fn evaluate<C: SystemContext>(
        &self,
        environment: &Environment,
        context: &mut C,
        expression: &Expression,
    ) -> Result<Value, RuntimeError> {
        match expression {
            Expression::Identifier(name) => self.evaluate_identifier(environment, name),
            Expression::IntegerLiteral(value) => Ok(Value::Integer(*value)),
            Expression::StringLiteral(value) => Ok(Value::String(value.clone())),
            Expression::BooleanLiteral(value) => Ok(Value::Boolean(*value)),
            Expression::ArrayLiteral(items) => {
                let items = self.evaluate_all(environment, context, items)?;
                Ok(Value::array(items))
            }
            Expression::HashLiteral(pairs) => self.evaluate_hash(environment, context, pairs),
            Expression::If {
                branches,
                alternative,
            } => self.evaluate_if(environment, context, branches, alternative.as_ref()),
            Expression::While { condition, body } => {
                self.evaluate_while(environment, context, condition, body)
            }
            Expression::FunctionLiteral { parameters, body } => {
                Ok(Value::Function(Rc::new(Function {
                    parameters: parameters.clone(),
                    body: body.clone(),
                    closure: environment.clone(),
                })))
            }
            Expression::Call { callee, arguments } => {
                let callee = self.evaluate(environment, context, callee)?.resolve();
                let arguments = self.evaluate_all(environment, context, arguments)?;
                self.call(context, callee, &arguments)
            }
            Expression::Index { receiver, index } => {
                let receiver = self.evaluate(environment, context, receiver)?.resolve();
                let index = self.evaluate(environment, context, index)?.resolve();
                self.evaluate_index(receiver, index)
            }
            Expression::Prefix { operator, operand } => {
                let operand = self.evaluate(environment, context, operand)?.resolve();
                match operator {
                    PrefixOperator::Bang => Ok(operand.logical_not()),
                    PrefixOperator::Minus => Ok(operand.numeric_negate()?),
                }
            }
            Expression::Infix {
                operator: InfixOperator::Assign,
                lhs,
                rhs,
            } => self.evaluate_assignment(environment, context, lhs, rhs),
            Expression::Infix { operator, lhs, rhs } => {
                let lhs = self.evaluate(environment, context, lhs)?.resolve();
                let rhs = self.evaluate(environment, context, rhs)?.resolve();
                Ok(lhs.binary(*operator, &rhs)?)
            }
        }
    }

    fn evaluate_all<C: SystemContext>(
        &self,
        environment: &Environment,
        context: &mut C,
        expressions: &[Expression],
    ) -> Result<Vec<Value>, RuntimeError> {
        expressions
            .iter()
            .map(|expression| Ok(self.evaluate(environment, context, expression)?.resolve()))
            .collect()
    }

    /// Variables shadow built-ins, so `let len = 1;` hides the `len` function.
    fn evaluate_identifier(
        &self,
        environment: &Environment,
        name: &CompactString,
    ) -> Result<Value, RuntimeError> {
        let value = environment
            .access(name)
            .or_else(|| lookup_builtin(name))
            .ok_or_else(|| RuntimeErrorKind::IdentifierNotFound(name.clone()))?;
        Ok(Value::Bound(Rc::new(BoundIdentifier {
            name: name.clone(),
            value,
        })))
    }

    fn evaluate_hash<C: SystemContext>(
        &self,
        environment: &Environment,
        context: &mut C,
        pairs: &[(HashKey, Expression)],
    ) -> Result<Value, RuntimeError> {
        let mut items = HashMap::with_capacity(pairs.len());
        for (key, value) in pairs {
            let key = match key {
                HashKey::StringLiteral(key) => key.clone(),
                HashKey::Identifier(name) => {
                    match self.evaluate_identifier(environment, name)?.resolve() {
                        Value::String(key) => key,
                        value => return Err(RuntimeErrorKind::NonStringKey(value.type_name()).into()),
                    }
                }
            };
            let value = self.evaluate(environment, context, value)?.resolve();
            items.insert(key, value);
        }
        Ok(Value::hash(items))
    }

    fn evaluate_if<C: SystemContext>(
        &self,
        environment: &Environment,
        context: &mut C,
        branches: &[ConditionalBranch],
        alternative: Option<&BlockStatement>,
    ) -> Result<Value, RuntimeError> {
        for branch in branches {
            let condition = self
                .evaluate(environment, context, &branch.condition)?
                .resolve();
            if condition.is_truthy() {
                return self.interpret_block(environment, context, &branch.consequence);
            }
        }
        match alternative {
            Some(alternative) => self.interpret_block(environment, context, alternative),
            None => Ok(Value::Null),
        }
    }

    fn evaluate_while<C: SystemContext>(
        &self,
        environment: &Environment,
        context: &mut C,
        condition: &Expression,
        body: &BlockStatement,
    ) -> Result<Value, RuntimeError> {
        loop {
            match self.evaluate(environment, context, condition)?.resolve() {
                Value::Boolean(true) => {
                    let result = self.interpret_block(environment, context, body)?;
                    if matches!(result, Value::Return(_)) {
                        return Ok(result);
                    }
                }
                Value::Boolean(false) => return Ok(Value::Null),
                value => {
                    return Err(RuntimeErrorKind::NonBooleanCondition(value.type_name()).into())
                }
            }
        }
    }

    fn evaluate_index(&self, receiver: Value, index: Value) -> Result<Value, RuntimeError> {
        let (key, value) = match (&receiver, index) {
            (Value::Array(items), Value::Integer(index)) => {
                let items = items.borrow();
                let value = usize::try_from(index)
                    .ok()
                    .and_then(|position| items.get(position).map(|value| (position, value)));
                match value {
                    Some((position, value)) => (ElementKey::Index(position), value.clone()),
                    None => return Err(RuntimeErrorKind::IndexOutOfBounds(index).into()),
                }
            }
            (Value::Array(_), index) => {
                return Err(RuntimeErrorKind::NonIntegerIndex(index.type_name()).into())
            }
            (Value::Hash(items), Value::String(key)) => {
                let value = items.borrow().get(&key).cloned().unwrap_or(Value::Null);
                (ElementKey::Key(key), value)
            }
            (Value::Hash(_), index) => {
                return Err(RuntimeErrorKind::NonStringKey(index.type_name()).into())
            }
            (receiver, _) => {
                return Err(RuntimeErrorKind::NotIndexable(receiver.type_name()).into())
            }
        };
        Ok(Value::Element(Rc::new(Element {
            collection: receiver,
            key,
            value,
        })))
    }

    fn evaluate_assignment<C: SystemContext>(
        &self,
        environment: &Environment,
        context: &mut C,
        lhs: &Expression,
        rhs: &Expression,
    ) -> Result<Value, RuntimeError> {
        let target = self.evaluate(environment, context, lhs)?;
        let value = self.evaluate(environment, context, rhs)?.resolve();
        match target {
            Value::Bound(bound) => {
                environment
                    .assign(&bound.name, value)
                    .map_err(|_| RuntimeErrorKind::UnboundAssignment(bound.name.clone()))?;
            }
            Value::Element(element) => match (&element.collection, &element.key) {
                (Value::Array(items), ElementKey::Index(position)) => {
                    let mut items = items.borrow_mut();
                    let Some(slot) = items.get_mut(*position) else {
                        return Err(RuntimeErrorKind::IndexOutOfBounds(*position as i64).into());
                    };
                    *slot = value;
                }
                (Value::Hash(items), ElementKey::Key(key)) => {
                    items.borrow_mut().insert(key.clone(), value);
                }
                (collection, _) => {
                    return Err(
                        RuntimeErrorKind::InvalidAssignmentTarget(collection.type_name()).into(),
                    )
                }
            },
            target => {
                return Err(RuntimeErrorKind::InvalidAssignmentTarget(target.type_name()).into())
            }
        }
        Ok(Value::Null)
    }

    /// Applies a function or a built-in to already evaluated arguments.
    pub fn call<C: SystemContext>(
        &self,
        context: &mut C,
        callee: Value,
        arguments: &[Value],
    ) -> Result<Value, RuntimeError> {
        match callee {
            Value::Function(function) => {
                tracing::trace!(
                    parameters = function.parameters.len(),
                    arguments = arguments.len(),
                    "calling function"
                );
                // Missing arguments stay unbound and extra ones are dropped.
                let scope = function.closure.new_scope();
                for (parameter, argument) in function.parameters.iter().zip(arguments) {
                    scope.declare(parameter, argument.clone());
                }
                match self.interpret_block(&scope, context, &function.body)? {
                    Value::Return(value) => Ok((*value).resolve()),
                    _ => Ok(Value::Null),
                }
            }
            Value::Builtin(native) => {
                tracing::trace!(name = native.get_name(), "calling builtin");
                native.call(arguments, context)
            }
            callee => Err(RuntimeErrorKind::NotAFunction(callee.to_string().into()).into()),
        }
    }
}
